//! Dashboard Facade
//!
//! View-building and command operations composing the repositories, the
//! object store, and the analytics pass. This is the surface a front end
//! talks to: one call per screen or user action, with the fan-out,
//! enrichment, and multi-step sequencing handled here.
//!
//! Independent reads are issued concurrently and joined; dependent sequences
//! (onboarding, upload-then-record) never overlap their steps.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use pd_store::{collections, subscribe, DocumentStore, ObjectStore, RecordQuery, StoredObject, Subscription};

use crate::analytics::{compute_analytics, AnalyticsSnapshot};
use crate::auth::Session;
use crate::document::{DocumentRepository, PropertyDocument};
use crate::maintenance::{IssueStatus, MaintenanceIssue, MaintenanceRepository};
use crate::principal::{IdentityDocument, Principal, PrincipalRepository, PrincipalRole};
use crate::property::{Property, PropertyKind, PropertyRepository, TenantAssignment};
use crate::shared::codec;
use crate::shared::error::{PlatformError, Result};

/// Address shown for a maintenance issue whose property no longer exists.
pub const UNKNOWN_PROPERTY: &str = "Unknown Property";

/// Vendor assigned to a freshly reported issue until the owner picks one.
pub const DEFAULT_VENDOR: &str = "Pending Assignment";

/// Lease type recorded when the caller does not specify one.
pub const DEFAULT_LEASE_TYPE: &str = "Fixed";

const IDENTIFICATION_FOLDER: &str = "identification";
const DOCUMENTS_FOLDER: &str = "documents";

/// A maintenance issue joined with the address of its property.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedIssue {
    #[serde(flatten)]
    pub issue: MaintenanceIssue,
    /// Address of the referenced property, or [`UNKNOWN_PROPERTY`] when the
    /// reference dangles.
    pub address: String,
}

/// Everything the owner dashboard renders, fetched in one call.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerView {
    pub properties: Vec<Property>,
    pub issues: Vec<EnrichedIssue>,
    pub documents: Vec<PropertyDocument>,
    pub analytics: AnalyticsSnapshot,
}

/// Everything the tenant dashboard renders: the tenant's own property, its
/// issue history newest first, and its documents.
#[derive(Debug, Clone, Serialize)]
pub struct TenantView {
    pub property: Property,
    pub issues: Vec<MaintenanceIssue>,
    pub documents: Vec<PropertyDocument>,
}

/// One identification file handed over during onboarding.
#[derive(Debug, Clone)]
pub struct TenantFile {
    /// What the file proves ("aadhaar", "pan", ...). Becomes the label on the
    /// stored [`IdentityDocument`].
    pub label: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Command for [`Dashboard::onboard_tenant`].
#[derive(Debug, Clone)]
pub struct OnboardTenant {
    pub property_id: String,
    /// Caller-chosen human-readable id; doubles as the tenant's login name.
    pub username: String,
    pub tenant_name: String,
    pub phone: Option<String>,
    pub rent_amount: i64,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub files: Vec<TenantFile>,
}

/// What a completed onboarding produced.
#[derive(Debug, Clone)]
pub struct OnboardingOutcome {
    pub tenant: Principal,
    pub property_id: String,
    pub uploaded: Vec<StoredObject>,
}

/// Command for [`Dashboard::add_property`].
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub address: String,
    pub kind: PropertyKind,
    pub rent_amount: i64,
    /// Defaults to [`DEFAULT_LEASE_TYPE`].
    pub lease_type: Option<String>,
    /// Defaults to the session principal's display name.
    pub landlord_name: Option<String>,
}

/// Command for [`Dashboard::report_issue`]. The property is the session
/// principal's own; date, status, cost, and vendor take their defaults.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub category: Option<String>,
    pub description: String,
}

/// Command for [`Dashboard::attach_document`].
#[derive(Debug, Clone)]
pub struct AttachDocument {
    pub property_id: String,
    pub tenant_id: Option<String>,
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Defaults to `"Lease/Contract"`.
    pub doc_type: Option<String>,
}

/// Typed access layer over the document and object stores.
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    properties: PropertyRepository,
    maintenance: MaintenanceRepository,
    documents: DocumentRepository,
    principals: PrincipalRepository,
}

impl Dashboard {
    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            properties: PropertyRepository::new(Arc::clone(&store)),
            maintenance: MaintenanceRepository::new(Arc::clone(&store)),
            documents: DocumentRepository::new(Arc::clone(&store)),
            principals: PrincipalRepository::new(Arc::clone(&store)),
            store,
            objects,
        }
    }

    /// Fetch everything the owner dashboard shows in one concurrent fan-out.
    ///
    /// The three reads are independent; any failure fails the whole view.
    /// Analytics are computed from the fetched data, not refetched, so the
    /// numbers always agree with the lists next to them.
    pub async fn owner_view(&self, session: &Session) -> Result<OwnerView> {
        debug!(principal = %session.principal.id, "building owner view");

        let (properties, issues, documents) = tokio::try_join!(
            self.properties.find_all(),
            self.maintenance.find_all(),
            self.documents.find_all(),
        )?;

        let analytics = compute_analytics(&properties, &issues);

        let addresses: HashMap<&str, &str> = properties
            .iter()
            .map(|property| (property.id.as_str(), property.address.as_str()))
            .collect();
        let issues = issues
            .into_iter()
            .map(|issue| {
                let address = addresses
                    .get(issue.property_id.as_str())
                    .map_or(UNKNOWN_PROPERTY, |found| *found)
                    .to_string();
                EnrichedIssue { issue, address }
            })
            .collect();

        Ok(OwnerView {
            properties,
            issues,
            documents,
            analytics,
        })
    }

    /// Fetch the tenant dashboard: the session principal's property, its
    /// issues newest first, and its documents, concurrently.
    pub async fn tenant_view(&self, session: &Session) -> Result<TenantView> {
        let property_id = assigned_property(&session.principal)?;
        debug!(principal = %session.principal.id, property = %property_id, "building tenant view");

        let (property, issues, documents) = tokio::try_join!(
            self.properties.get(property_id),
            self.maintenance.find_by_property(property_id),
            self.documents.find_by_property(property_id),
        )?;

        Ok(TenantView {
            property,
            issues,
            documents,
        })
    }

    /// Onboard a tenant onto a property: upload identification files, create
    /// the tenant record, then patch the property with the tenant reference,
    /// lease terms, and `Occupied` status.
    ///
    /// The steps are dependent and run in order with no rollback. A failure
    /// before the tenant record commits is an ordinary error (uploaded blobs
    /// are unreferenced and harmless); a property-patch failure after the
    /// tenant committed surfaces as [`PlatformError::PartialOnboarding`] so
    /// the caller knows exactly what state was left behind.
    pub async fn onboard_tenant(
        &self,
        session: &Session,
        command: OnboardTenant,
    ) -> Result<OnboardingOutcome> {
        info!(
            principal = %session.principal.id,
            property = %command.property_id,
            tenant = %command.username,
            files = command.files.len(),
            "onboarding tenant"
        );

        let mut uploaded = Vec::with_capacity(command.files.len());
        let mut identity_documents = Vec::with_capacity(command.files.len());
        for file in command.files {
            let stored = self
                .objects
                .upload(IDENTIFICATION_FOLDER, &file.filename, file.bytes)
                .await?;
            identity_documents.push(IdentityDocument::new(file.label, stored.url.clone()));
            uploaded.push(stored);
        }

        let mut tenant = Principal::new(
            command.username,
            command.tenant_name.clone(),
            PrincipalRole::Tenant,
        )
        .with_property(command.property_id.clone())
        .with_identity_documents(identity_documents);
        if let Some(phone) = command.phone {
            tenant = tenant.with_phone(phone);
        }
        self.principals.insert(&tenant).await?;

        let assignment = TenantAssignment {
            tenant_id: tenant.id.clone(),
            tenant_name: command.tenant_name,
            rent_amount: command.rent_amount,
            lease_start_date: command.lease_start_date,
            lease_end_date: command.lease_end_date,
        };
        if let Err(source) = self
            .properties
            .assign_tenant(&command.property_id, &assignment)
            .await
        {
            warn!(
                tenant = %tenant.id,
                property = %command.property_id,
                "property update failed after tenant record committed"
            );
            return Err(PlatformError::partial_onboarding(
                tenant.id,
                command.property_id,
                source,
            ));
        }

        info!(tenant = %tenant.id, property = %command.property_id, "tenant onboarded");
        Ok(OnboardingOutcome {
            tenant,
            property_id: command.property_id,
            uploaded,
        })
    }

    /// Register a new property, vacant until a tenant is onboarded.
    pub async fn add_property(&self, session: &Session, command: NewProperty) -> Result<Property> {
        let landlord_name = command
            .landlord_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| session.principal.name.clone());
        let lease_type = command
            .lease_type
            .unwrap_or_else(|| DEFAULT_LEASE_TYPE.to_string());

        let property = Property::new(
            command.address,
            command.kind,
            command.rent_amount,
            landlord_name,
        )
        .with_lease_type(lease_type);
        self.properties.insert(&property).await?;

        info!(property = %property.id, address = %property.address, "property added");
        Ok(property)
    }

    /// File a maintenance issue against the session principal's property.
    ///
    /// New issues open dated today with zero cost and the vendor pending
    /// assignment; the owner fills those in as the work progresses.
    pub async fn report_issue(
        &self,
        session: &Session,
        command: NewIssue,
    ) -> Result<MaintenanceIssue> {
        let property_id = assigned_property(&session.principal)?;

        let mut issue = MaintenanceIssue::new(property_id, command.description, today())
            .with_vendor(DEFAULT_VENDOR);
        if let Some(category) = command.category {
            issue = issue.with_category(category);
        }
        self.maintenance.insert(&issue).await?;

        info!(issue = %issue.id, property = %issue.property_id, "maintenance issue reported");
        Ok(issue)
    }

    /// Move a maintenance issue through its lifecycle.
    pub async fn update_issue_status(
        &self,
        session: &Session,
        issue_id: &str,
        status: IssueStatus,
    ) -> Result<()> {
        debug!(principal = %session.principal.id, issue = %issue_id, ?status, "updating issue status");
        self.maintenance.set_status(issue_id, status).await
    }

    /// Upload a file and record it against a property. The record is written
    /// only after the upload succeeds, so every stored record has a live URL.
    pub async fn attach_document(
        &self,
        session: &Session,
        command: AttachDocument,
    ) -> Result<PropertyDocument> {
        debug!(principal = %session.principal.id, property = %command.property_id, "attaching document");

        let stored = self
            .objects
            .upload(DOCUMENTS_FOLDER, &command.filename, command.bytes)
            .await?;

        let mut document = PropertyDocument::new(command.property_id, command.filename, stored.url);
        if let Some(tenant_id) = command.tenant_id {
            document = document.with_tenant(tenant_id);
        }
        if let Some(doc_type) = command.doc_type {
            document = document.with_doc_type(doc_type);
        }
        self.documents.insert(&document).await?;

        Ok(document)
    }

    /// Live query over the full property list. The callback receives the
    /// current result set on registration and again after every change.
    pub fn watch_properties<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<Property>) + Send + Sync + 'static,
    {
        subscribe(
            Arc::clone(&self.store),
            collections::PROPERTIES,
            None,
            move |records| callback(codec::decode_lossy(collections::PROPERTIES, records)),
        )
    }

    /// Live query over all maintenance issues, newest first.
    pub fn watch_maintenance<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<MaintenanceIssue>) + Send + Sync + 'static,
    {
        let query = RecordQuery::all().order_by_desc("date");
        subscribe(
            Arc::clone(&self.store),
            collections::MAINTENANCE,
            Some(query),
            move |records| callback(codec::decode_lossy(collections::MAINTENANCE, records)),
        )
    }
}

/// The property a tenant session is allowed to see. Principals without an
/// assignment have nothing to show, which reads as the property not being
/// found rather than a distinct error shape.
fn assigned_property(principal: &Principal) -> Result<&str> {
    principal
        .property_id
        .as_deref()
        .ok_or_else(|| PlatformError::not_found("Property", format!("<none assigned to '{}'>", principal.id)))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
