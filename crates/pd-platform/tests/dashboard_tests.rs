//! Dashboard Integration Tests
//!
//! End-to-end flows over the in-memory stores:
//! - Owner dashboard fan-out, enrichment, and analytics agreement
//! - Tenant dashboard scoping and newest-first ordering
//! - Tenant onboarding, including the partial-failure contract
//! - Sign-in, profile merging, and session observers
//! - Command operations and their defaults
//! - Live queries feeding typed result sets

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use pd_platform::auth::{Argon2Config, PasswordPolicy};
use pd_platform::{
    AttachDocument, AuthClient, Dashboard, DocumentRepository, IdentityProvider, IssueStatus,
    MaintenanceIssue, MaintenanceRepository, NewIssue, NewProperty, NewRegistration,
    OccupancyStatus, OnboardTenant, PasswordService, PlatformError, Principal,
    PrincipalRepository, PrincipalRole, Property, PropertyKind, PropertyRepository, Session,
    StoredCredentialProvider, TenantFile, DEFAULT_DOCUMENT_TYPE, UNKNOWN_PROPERTY,
};
use pd_store::{collections, DocumentStore, InMemoryDocumentStore, InMemoryObjectStore, StoreOp};

struct Harness {
    store: Arc<InMemoryDocumentStore>,
    objects: Arc<InMemoryObjectStore>,
    dashboard: Dashboard,
    auth: AuthClient,
    properties: PropertyRepository,
    maintenance: MaintenanceRepository,
    documents: DocumentRepository,
    principals: PrincipalRepository,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new());
    let objects = Arc::new(InMemoryObjectStore::new());
    let document_store: Arc<dyn DocumentStore> = store.clone();
    let provider = StoredCredentialProvider::new(
        document_store.clone(),
        PasswordService::new(Argon2Config::testing(), PasswordPolicy::lenient()),
    );
    Harness {
        dashboard: Dashboard::new(document_store.clone(), objects.clone()),
        auth: AuthClient::new(Arc::new(provider), document_store.clone()),
        properties: PropertyRepository::new(document_store.clone()),
        maintenance: MaintenanceRepository::new(document_store.clone()),
        documents: DocumentRepository::new(document_store.clone()),
        principals: PrincipalRepository::new(document_store),
        store,
        objects,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

/// A second provider over the same store, for seeding credentials without
/// touching the client under test.
fn credential_provider(h: &Harness) -> StoredCredentialProvider {
    StoredCredentialProvider::new(
        h.store.clone(),
        PasswordService::new(Argon2Config::testing(), PasswordPolicy::lenient()),
    )
}

async fn owner_session(h: &Harness) -> Session {
    h.auth
        .register(NewRegistration {
            email: "asha@propdesk.test".to_string(),
            password: "owner-pass".to_string(),
            name: "Asha Verma".to_string(),
            role: PrincipalRole::Owner,
            property_id: None,
        })
        .await
        .expect("owner registration")
}

async fn tenant_session(h: &Harness, property_id: Option<&str>) -> Session {
    h.auth
        .register(NewRegistration {
            email: "rahul@propdesk.test".to_string(),
            password: "tenant-pass".to_string(),
            name: "Rahul Sharma".to_string(),
            role: PrincipalRole::Tenant,
            property_id: property_id.map(str::to_string),
        })
        .await
        .expect("tenant registration")
}

async fn seed_property(h: &Harness, address: &str, rent: i64) -> Property {
    let property = Property::new(address, PropertyKind::Residential, rent, "Asha Verma");
    h.properties.insert(&property).await.expect("seed property");
    property
}

async fn seed_issue(h: &Harness, issue: &MaintenanceIssue) {
    h.maintenance.insert(issue).await.expect("seed issue");
}

mod owner_dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_view_joins_reads_and_computes_analytics() {
        let h = harness();
        let session = owner_session(&h).await;

        let palm = seed_property(&h, "12 Palm Grove", 85_000).await;
        let lake = seed_property(&h, "7 Lake View", 150_000).await;

        seed_issue(
            &h,
            &MaintenanceIssue::new(&palm.id, "Kitchen tap leaking", date("2024-04-02"))
                .with_category("plumbing")
                .with_cost(4_500)
                .with_status(IssueStatus::Resolved),
        )
        .await;
        seed_issue(
            &h,
            &MaintenanceIssue::new(&lake.id, "Mains tripping", date("2024-05-14"))
                .with_category("electrical")
                .with_cost(12_000)
                .with_status(IssueStatus::InProgress),
        )
        .await;
        seed_issue(
            &h,
            &MaintenanceIssue::new(&palm.id, "Gate hinge loose", date("2024-06-01")),
        )
        .await;

        let view = h.dashboard.owner_view(&session).await.expect("owner view");

        assert_eq!(view.properties.len(), 2);
        assert_eq!(view.issues.len(), 3);
        assert!(view.documents.is_empty());

        // every issue carries the address of its property
        for issue in &view.issues {
            let expected = if issue.issue.property_id == palm.id {
                &palm.address
            } else {
                &lake.address
            };
            assert_eq!(&issue.address, expected);
        }

        // the snapshot agrees with the lists it sits next to
        assert_eq!(view.analytics.total_properties, 2);
        assert_eq!(view.analytics.total_monthly_rent, 235_000);
        assert_eq!(view.analytics.active_issues, 1);
        assert_eq!(view.analytics.total_maintenance_cost, 16_500);
        let categories: Vec<&str> = view
            .analytics
            .issues_by_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert!(categories.contains(&"plumbing"));
        assert!(categories.contains(&"electrical"));
        assert!(categories.contains(&"Other"));
    }

    #[tokio::test]
    async fn test_owner_view_flags_dangling_property_reference() {
        let h = harness();
        let session = owner_session(&h).await;

        seed_issue(
            &h,
            &MaintenanceIssue::new("no-such-property", "Orphaned issue", date("2024-01-10")),
        )
        .await;

        let view = h.dashboard.owner_view(&session).await.expect("owner view");
        assert_eq!(view.issues.len(), 1);
        assert_eq!(view.issues[0].address, UNKNOWN_PROPERTY);
    }

    #[tokio::test]
    async fn test_owner_view_fails_when_any_read_fails() {
        let h = harness();
        let session = owner_session(&h).await;
        seed_property(&h, "12 Palm Grove", 85_000).await;

        h.store.deny(collections::MAINTENANCE, StoreOp::Query);

        let err = h.dashboard.owner_view(&session).await.unwrap_err();
        match err {
            PlatformError::PermissionDenied { context, hint } => {
                assert_eq!(context, collections::MAINTENANCE);
                assert!(hint.contains("access rules"));
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }
}

mod tenant_dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn test_tenant_view_scopes_to_assigned_property() {
        let h = harness();
        let mine = seed_property(&h, "12 Palm Grove", 85_000).await;
        let other = seed_property(&h, "7 Lake View", 150_000).await;
        let session = tenant_session(&h, Some(&mine.id)).await;

        seed_issue(
            &h,
            &MaintenanceIssue::new(&mine.id, "Tap leaking", date("2024-04-02")),
        )
        .await;
        seed_issue(
            &h,
            &MaintenanceIssue::new(&other.id, "Not my problem", date("2024-04-03")),
        )
        .await;

        let view = h.dashboard.tenant_view(&session).await.expect("tenant view");

        assert_eq!(view.property.id, mine.id);
        assert_eq!(view.issues.len(), 1);
        assert_eq!(view.issues[0].property_id, mine.id);
        assert!(view.documents.is_empty());
    }

    #[tokio::test]
    async fn test_tenant_view_orders_issues_newest_first() {
        let h = harness();
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;
        let session = tenant_session(&h, Some(&property.id)).await;

        // inserted out of order; the in-memory store ignores ordering hints,
        // so this exercises the typed re-sort
        for day in ["2024-03-02", "2024-07-19", "2024-05-11"] {
            seed_issue(&h, &MaintenanceIssue::new(&property.id, "Issue", date(day))).await;
        }

        let view = h.dashboard.tenant_view(&session).await.expect("tenant view");
        let dates: Vec<String> = view.issues.iter().map(|i| i.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-07-19", "2024-05-11", "2024-03-02"]);
    }

    #[tokio::test]
    async fn test_tenant_view_without_property_is_not_found() {
        let h = harness();
        let session = tenant_session(&h, None).await;

        let err = h.dashboard.tenant_view(&session).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }
}

mod onboarding_tests {
    use super::*;

    fn onboarding_command(property_id: &str) -> OnboardTenant {
        OnboardTenant {
            property_id: property_id.to_string(),
            username: "rahul_sharma".to_string(),
            tenant_name: "Rahul Sharma".to_string(),
            phone: Some("9876543210".to_string()),
            rent_amount: 95_000,
            lease_start_date: Some(date("2024-05-01")),
            lease_end_date: Some(date("2025-04-30")),
            files: vec![
                TenantFile {
                    label: "aadhaar".to_string(),
                    filename: "Aadhaar Card.pdf".to_string(),
                    bytes: b"aadhaar bytes".to_vec(),
                },
                TenantFile {
                    label: "pan".to_string(),
                    filename: "PAN.pdf".to_string(),
                    bytes: b"pan bytes".to_vec(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_onboarding_uploads_creates_tenant_and_patches_property() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "7 Lake View", 0).await;

        let outcome = h
            .dashboard
            .onboard_tenant(&session, onboarding_command(&property.id))
            .await
            .expect("onboarding");

        assert_eq!(outcome.tenant.id, "rahul_sharma");
        assert_eq!(outcome.property_id, property.id);
        assert_eq!(outcome.uploaded.len(), 2);
        assert!(outcome.uploaded.iter().all(|o| o.key.starts_with("identification/")));

        // tenant record is persisted under the chosen username
        let tenant = h.principals.get("rahul_sharma").await.expect("tenant record");
        assert_eq!(tenant.role, PrincipalRole::Tenant);
        assert_eq!(tenant.property_id.as_deref(), Some(property.id.as_str()));
        assert_eq!(tenant.phone.as_deref(), Some("9876543210"));
        let labels: Vec<&str> = tenant
            .identity_documents
            .iter()
            .map(|d| d.label.as_str())
            .collect();
        assert_eq!(labels, vec!["aadhaar", "pan"]);

        // the property patch landed as one piece
        let patched = h.properties.get(&property.id).await.expect("property");
        assert_eq!(patched.tenant_id.as_deref(), Some("rahul_sharma"));
        assert_eq!(patched.tenant_name.as_deref(), Some("Rahul Sharma"));
        assert_eq!(patched.rent_amount, 95_000);
        assert_eq!(patched.status, OccupancyStatus::Occupied);
        assert_eq!(patched.lease_start_date, Some(date("2024-05-01")));
        assert_eq!(patched.lease_end_date, Some(date("2025-04-30")));

        // both files landed in the object store
        assert_eq!(h.objects.len(), 2);
    }

    #[tokio::test]
    async fn test_onboarding_property_failure_reports_partial_state() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "7 Lake View", 0).await;

        h.store.deny(collections::PROPERTIES, StoreOp::Update);

        let err = h
            .dashboard
            .onboard_tenant(&session, onboarding_command(&property.id))
            .await
            .unwrap_err();

        match err {
            PlatformError::PartialOnboarding {
                tenant_id,
                property_id,
                source,
            } => {
                assert_eq!(tenant_id, "rahul_sharma");
                assert_eq!(property_id, property.id);
                assert!(matches!(*source, PlatformError::PermissionDenied { .. }));
            }
            other => panic!("expected PartialOnboarding, got {other:?}"),
        }

        // no rollback: the tenant record stays committed
        let tenant = h.principals.find_by_id("rahul_sharma").await.expect("lookup");
        assert!(tenant.is_some());

        // and the property is untouched
        let untouched = h.properties.get(&property.id).await.expect("property");
        assert_eq!(untouched.status, OccupancyStatus::Vacant);
        assert!(untouched.tenant_id.is_none());
    }

    #[tokio::test]
    async fn test_onboarding_upload_failure_commits_nothing() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "7 Lake View", 0).await;

        h.objects.fail_uploads(true);

        let err = h
            .dashboard
            .onboard_tenant(&session, onboarding_command(&property.id))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Upload(_)));

        let tenant = h.principals.find_by_id("rahul_sharma").await.expect("lookup");
        assert!(tenant.is_none());
        let untouched = h.properties.get(&property.id).await.expect("property");
        assert_eq!(untouched.status, OccupancyStatus::Vacant);
    }
}

mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_returns_profile_with_auth_email_backfilled() {
        let h = harness();

        // a credential with a profile that never recorded an email
        let identity = credential_provider(&h)
            .register("meera@propdesk.test", "secret-1")
            .await
            .expect("credential");
        let profile = Principal::new(&identity.user_id, "Meera Nair", PrincipalRole::Owner);
        h.principals.insert(&profile).await.expect("profile");

        let session = h
            .auth
            .sign_in("meera@propdesk.test", "secret-1")
            .await
            .expect("sign in");

        assert_eq!(session.principal.id, identity.user_id);
        assert_eq!(session.principal.name, "Meera Nair");
        assert_eq!(session.principal.email.as_deref(), Some("meera@propdesk.test"));
    }

    #[tokio::test]
    async fn test_sign_in_keeps_profile_email_when_present() {
        let h = harness();
        owner_session(&h).await;
        h.auth.sign_out();

        let session = h
            .auth
            .sign_in("asha@propdesk.test", "owner-pass")
            .await
            .expect("sign in");
        assert_eq!(session.principal.email.as_deref(), Some("asha@propdesk.test"));
        assert_eq!(session.principal.name, "Asha Verma");
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_credentials() {
        let h = harness();
        owner_session(&h).await;
        h.auth.sign_out();

        let wrong_password = h.auth.sign_in("asha@propdesk.test", "nope").await.unwrap_err();
        assert!(matches!(wrong_password, PlatformError::InvalidCredentials));

        let unknown_email = h.auth.sign_in("nobody@propdesk.test", "nope").await.unwrap_err();
        assert!(matches!(unknown_email, PlatformError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_in_missing_profile_is_fatal() {
        let h = harness();
        credential_provider(&h)
            .register("ghost@propdesk.test", "secret-2")
            .await
            .expect("credential");

        let err = h
            .auth
            .sign_in("ghost@propdesk.test", "secret-2")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_profile_permission_failure_carries_hint() {
        let h = harness();
        owner_session(&h).await;
        h.auth.sign_out();

        h.store.deny(collections::USERS, StoreOp::Get);

        let err = h
            .auth
            .sign_in("asha@propdesk.test", "owner-pass")
            .await
            .unwrap_err();
        match err {
            PlatformError::PermissionDenied { context, hint } => {
                assert_eq!(context, collections::USERS);
                assert!(hint.contains("access rules"));
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_on_change_delivers_session_shapes_until_deregistered() {
        let h = harness();

        let seen: Arc<parking_lot::Mutex<Vec<Option<String>>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let guard = h.auth.on_change(move |principal| {
            sink.lock().push(principal.map(|p| p.id));
        });

        let session = owner_session(&h).await;
        h.auth.sign_out();

        {
            let events = seen.lock();
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].as_deref(), Some(session.principal.id.as_str()));
            assert!(events[1].is_none());
        }

        guard.deregister();
        guard.deregister(); // idempotent

        h.auth
            .sign_in("asha@propdesk.test", "owner-pass")
            .await
            .expect("sign in");
        assert_eq!(seen.lock().len(), 2, "no delivery after deregistration");
    }
}

mod command_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_property_fills_defaults() {
        let h = harness();
        let session = owner_session(&h).await;

        let property = h
            .dashboard
            .add_property(
                &session,
                NewProperty {
                    address: "3 Rose Walk".to_string(),
                    kind: PropertyKind::Commercial,
                    rent_amount: 60_000,
                    lease_type: None,
                    landlord_name: None,
                },
            )
            .await
            .expect("add property");

        assert_eq!(property.lease_type.as_deref(), Some("Fixed"));
        assert_eq!(property.landlord_name, "Asha Verma");
        assert_eq!(property.status, OccupancyStatus::Vacant);

        let stored = h.properties.get(&property.id).await.expect("stored");
        assert_eq!(stored.address, "3 Rose Walk");
        assert_eq!(stored.kind, PropertyKind::Commercial);
    }

    #[tokio::test]
    async fn test_report_issue_fills_defaults() {
        let h = harness();
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;
        let session = tenant_session(&h, Some(&property.id)).await;

        let issue = h
            .dashboard
            .report_issue(
                &session,
                NewIssue {
                    category: None,
                    description: "Ceiling fan wobbles".to_string(),
                },
            )
            .await
            .expect("report issue");

        assert_eq!(issue.property_id, property.id);
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.cost, 0);
        assert_eq!(issue.vendor.as_deref(), Some("Pending Assignment"));
        assert_eq!(issue.date, Utc::now().date_naive());
        assert!(issue.category.is_none());

        let stored = h
            .maintenance
            .find_by_property(&property.id)
            .await
            .expect("stored");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "Ceiling fan wobbles");
    }

    #[tokio::test]
    async fn test_report_issue_without_property_is_not_found() {
        let h = harness();
        let session = tenant_session(&h, None).await;

        let err = h
            .dashboard
            .report_issue(
                &session,
                NewIssue {
                    category: Some("plumbing".to_string()),
                    description: "No property to pin this on".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_issue_status_moves_lifecycle() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;
        let issue = MaintenanceIssue::new(&property.id, "Tap leaking", date("2024-04-02"));
        seed_issue(&h, &issue).await;

        h.dashboard
            .update_issue_status(&session, &issue.id, IssueStatus::InProgress)
            .await
            .expect("status update");

        let stored = h
            .maintenance
            .find_by_property(&property.id)
            .await
            .expect("stored");
        assert_eq!(stored[0].status, IssueStatus::InProgress);

        let missing = h
            .dashboard
            .update_issue_status(&session, "no-such-issue", IssueStatus::Resolved)
            .await
            .unwrap_err();
        assert!(matches!(missing, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_attach_document_uploads_then_records() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;

        let document = h
            .dashboard
            .attach_document(
                &session,
                AttachDocument {
                    property_id: property.id.clone(),
                    tenant_id: Some("rahul_sharma".to_string()),
                    filename: "Lease Agreement 2024.pdf".to_string(),
                    bytes: b"lease bytes".to_vec(),
                    doc_type: None,
                },
            )
            .await
            .expect("attach document");

        assert_eq!(document.doc_type, DEFAULT_DOCUMENT_TYPE);
        assert_eq!(document.filename, "Lease Agreement 2024.pdf");
        assert!(!document.url.is_empty());

        assert_eq!(h.objects.len(), 1);
        assert!(h.objects.keys()[0].starts_with("documents/"));

        let stored = h
            .documents
            .find_by_property(&property.id)
            .await
            .expect("stored");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].tenant_id.as_deref(), Some("rahul_sharma"));
    }

    #[tokio::test]
    async fn test_attach_document_upload_failure_writes_no_record() {
        let h = harness();
        let session = owner_session(&h).await;
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;

        h.objects.fail_uploads(true);

        let err = h
            .dashboard
            .attach_document(
                &session,
                AttachDocument {
                    property_id: property.id.clone(),
                    tenant_id: None,
                    filename: "lease.pdf".to_string(),
                    bytes: b"bytes".to_vec(),
                    doc_type: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Upload(_)));

        let stored = h.documents.find_all().await.expect("list");
        assert!(stored.is_empty());
    }
}

mod live_view_tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Duration};

    async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("delivery within a second")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_watch_properties_delivers_typed_result_sets() {
        let h = harness();
        seed_property(&h, "12 Palm Grove", 85_000).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = h
            .dashboard
            .watch_properties(move |properties| drop(tx.send(properties)));

        let initial = next(&mut rx).await;
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].address, "12 Palm Grove");

        seed_property(&h, "7 Lake View", 150_000).await;
        let after_change = next(&mut rx).await;
        assert_eq!(after_change.len(), 2);

        sub.unsubscribe();
    }

    #[tokio::test]
    async fn test_watch_maintenance_delivers_newest_first() {
        let h = harness();
        let property = seed_property(&h, "12 Palm Grove", 85_000).await;
        for day in ["2024-03-02", "2024-07-19", "2024-05-11"] {
            seed_issue(&h, &MaintenanceIssue::new(&property.id, "Issue", date(day))).await;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = h
            .dashboard
            .watch_maintenance(move |issues| drop(tx.send(issues)));

        let initial = next(&mut rx).await;
        let dates: Vec<String> = initial.iter().map(|i| i.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-07-19", "2024-05-11", "2024-03-02"]);

        sub.unsubscribe();
    }
}
