// # Route 53 Zone Provider
//
// This crate provides the AWS Route 53 implementation of the rome53
// `ZoneLister` and `RecordUpdater` traits.
//
// ## Behaviour
//
// - ✅ Lists every hosted zone and every record set, following pagination
// - ✅ Replaces an A record's value in one atomic change batch
//   (DELETE of the current record set + CREATE of the new one, same TTL)
// - ✅ Reports the change id and its PENDING / INSYNC status
// - ✅ Maps rejected credentials to an authentication error
// - ❌ NO retry logic (a failed call fails the run)
// - ❌ NO waiting for propagation (owned by the workflow)
//
// ## Credentials
//
// Credentials come from the standard AWS provider chain, most commonly the
// `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` environment variables.
// They are never logged.
//
// ## API Endpoints Used
//
// - ListHostedZones: GET `/2013-04-01/hostedzone`
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/{Id}/rrset`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/{Id}/rrset`
// - GetChange: GET `/2013-04-01/change/{Id}`

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ChangeStatus as AwsChangeStatus, ResourceRecord,
    ResourceRecordSet, RrType,
};
use rome53_core::traits::{
    ChangeHandle, ChangeStatus, HostedZone, RecordSet, RecordType, RecordUpdater, ZoneLister,
};
use rome53_core::{Error, Result};
use std::net::Ipv4Addr;

/// Provider name used in errors and logs
const PROVIDER: &str = "route53";

/// Route 53 is a global service, signed in us-east-1
const DEFAULT_REGION: &str = "us-east-1";

/// Shown whenever credentials are missing or rejected
pub const CREDENTIALS_HINT: &str = "Have you set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY?";

/// Error codes Route 53 (and the STS signer) use for credential problems
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "IncompleteSignature",
    "InvalidClientTokenId",
    "InvalidSignatureException",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// AWS Route 53 provider
///
/// # Trust Level: Untrusted
///
/// Stateless: every call goes to the API, nothing is cached between calls.
#[derive(Clone)]
pub struct Route53Provider {
    /// Route 53 API client
    client: Client,
}

// The client carries credentials; keep them out of Debug output
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl Route53Provider {
    /// Connect using the ambient AWS configuration
    ///
    /// Credentials are resolved eagerly so that missing or unusable
    /// credentials surface here, before any lookup.
    ///
    /// # Errors
    ///
    /// - `Error::Authentication`: no credentials could be resolved
    pub async fn connect() -> Result<Self> {
        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let credentials = config
            .credentials_provider()
            .ok_or_else(|| Error::auth(format!("No credentials provider. {}", CREDENTIALS_HINT)))?;

        credentials.provide_credentials().await.map_err(|e| {
            Error::auth(format!("{}. {}", DisplayErrorContext(&e), CREDENTIALS_HINT))
        })?;

        tracing::debug!("AWS credentials resolved");
        Ok(Self::from_client(Client::new(&config)))
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ZoneLister for Route53Provider {
    async fn list_zones(&self) -> Result<Vec<HostedZone>> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_hosted_zones()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| map_sdk_error("ListHostedZones", e))?;

            for zone in output.hosted_zones() {
                zones.push(HostedZone::new(trim_id(zone.id()), zone.name()));
            }

            marker = next_zone_marker(output.is_truncated(), output.next_marker());
            if marker.is_none() {
                break;
            }
        }

        tracing::debug!("Listed {} hosted zone(s)", zones.len());
        Ok(zones)
    }

    async fn list_records(&self, zone: &HostedZone) -> Result<Vec<RecordSet>> {
        let mut records = Vec::new();
        let mut start: Option<RecordPage> = None;

        loop {
            let mut request = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(&zone.id);

            if let Some(page) = start.take() {
                request = request
                    .start_record_name(page.name)
                    .start_record_type(page.record_type)
                    .set_start_record_identifier(page.identifier);
            }

            let output = request
                .send()
                .await
                .map_err(|e| map_sdk_error("ListResourceRecordSets", e))?;

            for set in output.resource_record_sets() {
                records.push(RecordSet::new(
                    unescape_name(set.name()),
                    RecordType::from(set.r#type().as_str()),
                    set.ttl(),
                    set.resource_records()
                        .iter()
                        .map(|r| r.value().to_string())
                        .collect(),
                ));
            }

            start = next_record_page(
                output.is_truncated(),
                output.next_record_name(),
                output.next_record_type(),
                output.next_record_identifier(),
            );
            if start.is_none() {
                break;
            }
        }

        Ok(records)
    }

    fn provider_name(&self) -> &'static str {
        "Route 53"
    }
}

#[async_trait]
impl RecordUpdater for Route53Provider {
    async fn update_a(
        &self,
        zone: &HostedZone,
        current: &RecordSet,
        new_ip: Ipv4Addr,
    ) -> Result<ChangeHandle> {
        let batch = replace_a_batch(current, new_ip)?;

        tracing::info!(
            "Submitting change to {} in zone {}: {:?} -> {}",
            current.name,
            zone.id,
            current.values,
            new_ip
        );

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&zone.id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| map_sdk_error("ChangeResourceRecordSets", e))?;

        let info = output.change_info().ok_or_else(|| {
            Error::provider(PROVIDER, "Invalid response format: missing ChangeInfo")
        })?;

        Ok(ChangeHandle {
            id: trim_id(info.id()),
            status: status_from_aws(info.status()),
        })
    }

    async fn change_status(&self, change: &ChangeHandle) -> Result<ChangeStatus> {
        let output = self
            .client
            .get_change()
            .id(&change.id)
            .send()
            .await
            .map_err(|e| map_sdk_error("GetChange", e))?;

        let info = output.change_info().ok_or_else(|| {
            Error::provider(PROVIDER, "Invalid response format: missing ChangeInfo")
        })?;

        Ok(status_from_aws(info.status()))
    }
}

/// Marker for the next ListHostedZones page, if there is one
///
/// A truncated page without a marker ends the listing.
fn next_zone_marker(is_truncated: bool, next_marker: Option<&str>) -> Option<String> {
    next_marker
        .filter(|_| is_truncated)
        .map(str::to_string)
}

/// Where the next ListResourceRecordSets page starts
#[derive(Debug, Clone, PartialEq)]
struct RecordPage {
    name: String,
    record_type: RrType,
    /// Only set for weighted, latency and similar routing policies
    identifier: Option<String>,
}

fn next_record_page(
    is_truncated: bool,
    name: Option<&str>,
    record_type: Option<&RrType>,
    identifier: Option<&str>,
) -> Option<RecordPage> {
    if !is_truncated {
        return None;
    }

    Some(RecordPage {
        name: name?.to_string(),
        record_type: record_type?.clone(),
        identifier: identifier.map(str::to_string),
    })
}

/// Build the batch replacing `current` with a single-valued A record
///
/// The DELETE must match the live record exactly, so a record changed by
/// someone else since it was listed makes the whole batch fail.
fn replace_a_batch(current: &RecordSet, new_ip: Ipv4Addr) -> Result<ChangeBatch> {
    let ttl = current.ttl.ok_or_else(|| {
        Error::provider(
            PROVIDER,
            format!("{} has no TTL (alias records cannot be updated)", current.name),
        )
    })?;

    let old = a_record_set(&current.name, ttl, &current.values)?;
    let new = a_record_set(&current.name, ttl, &[new_ip.to_string()])?;

    ChangeBatch::builder()
        .comment(format!("rome53: {} -> {}", current.name, new_ip))
        .changes(
            Change::builder()
                .action(ChangeAction::Delete)
                .resource_record_set(old)
                .build()
                .map_err(build_error)?,
        )
        .changes(
            Change::builder()
                .action(ChangeAction::Create)
                .resource_record_set(new)
                .build()
                .map_err(build_error)?,
        )
        .build()
        .map_err(build_error)
}

fn a_record_set(name: &str, ttl: i64, values: &[String]) -> Result<ResourceRecordSet> {
    let records = values
        .iter()
        .map(|v| ResourceRecord::builder().value(v).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(build_error)?;

    ResourceRecordSet::builder()
        .name(name)
        .r#type(RrType::A)
        .ttl(ttl)
        .set_resource_records(Some(records))
        .build()
        .map_err(build_error)
}

fn build_error(e: aws_sdk_route53::error::BuildError) -> Error {
    Error::provider(PROVIDER, format!("Invalid change request: {}", e))
}

/// Anything not yet INSYNC counts as pending
fn status_from_aws(status: &AwsChangeStatus) -> ChangeStatus {
    match status {
        AwsChangeStatus::Insync => ChangeStatus::InSync,
        _ => ChangeStatus::Pending,
    }
}

/// Strip the `/hostedzone/` or `/change/` prefix from an id
fn trim_id(id: &str) -> String {
    id.rsplit('/').next().unwrap_or(id).to_string()
}

/// Route 53 returns `*` as the octal escape `\052`
fn unescape_name(name: &str) -> String {
    name.replace("\\052", "*").to_ascii_lowercase()
}

fn is_auth_error_code(code: &str) -> bool {
    AUTH_ERROR_CODES.contains(&code)
}

/// Map an SDK error to our error type
///
/// Credential problems become `Error::Authentication`; everything else is a
/// provider error carrying the full error context.
fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.as_service_error().and_then(|e| e.code());

    if code.is_some_and(is_auth_error_code) {
        return Error::auth(format!(
            "{} was rejected ({}). {}",
            operation,
            code.unwrap_or_default(),
            CREDENTIALS_HINT
        ));
    }

    Error::provider(
        PROVIDER,
        format!("{} failed: {}", operation, DisplayErrorContext(&err)),
    )
}
