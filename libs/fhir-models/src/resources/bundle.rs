//! Bundle resource

use super::Resource;
use crate::common::*;
use crate::element::fhir_element;
use rust_decimal::Decimal;

fhir_element! {
    /// A container for a collection of resources
    resource Bundle {
        /// Persistent identifier for the bundle
        identifier: Option<Box<Identifier>> = "identifier",
        /// document | message | transaction | transaction-response | batch |
        /// batch-response | history | searchset | collection
        type_: Primitive<Code> = "type",
        /// When the bundle was assembled
        timestamp: Primitive<Instant> = "timestamp",
        /// If search, the total number of matches
        total: Primitive<UnsignedInt> = "total",
        /// Links related to this Bundle
        link: Vec<BundleLink> = "link",
        /// Entry in the bundle - will have a resource or information
        entry: Vec<BundleEntry> = "entry",
    }
}

fhir_element! {
    backbone BundleLink("Bundle.link") {
        /// See http://www.iana.org/assignments/link-relations/link-relations.xhtml#link-relations-1
        relation: Primitive<FhirString> = "relation",
        /// Reference details for the link
        url: Primitive<Uri> = "url",
    }
}

fhir_element! {
    backbone BundleEntry("Bundle.entry") {
        link: Vec<BundleLink> = "link",
        /// URI for resource (Absolute URL server address or URI for UUID/OID)
        full_url: Primitive<Uri> = "fullUrl",
        /// A resource in the bundle
        resource: Option<Box<Resource>> = "resource",
        /// Search related information
        search: Option<Box<BundleEntrySearch>> = "search",
        /// Additional execution information (transaction/batch/history)
        request: Option<Box<BundleEntryRequest>> = "request",
        /// Results of execution (transaction/batch/history)
        response: Option<Box<BundleEntryResponse>> = "response",
    }
}

fhir_element! {
    backbone BundleEntrySearch("Bundle.entry.search") {
        /// match | include | outcome - why this is in the result set
        mode: Primitive<Code> = "mode",
        /// Search ranking (between 0 and 1)
        score: Primitive<Decimal> = "score",
    }
}

fhir_element! {
    backbone BundleEntryRequest("Bundle.entry.request") {
        /// GET | HEAD | POST | PUT | DELETE | PATCH
        method: Primitive<Code> = "method",
        /// URL for HTTP equivalent of this entry
        url: Primitive<Uri> = "url",
        /// For managing cache currency
        if_none_match: Primitive<FhirString> = "ifNoneMatch",
        if_modified_since: Primitive<Instant> = "ifModifiedSince",
        /// For managing update contention
        if_match: Primitive<FhirString> = "ifMatch",
        /// For conditional creates
        if_none_exist: Primitive<FhirString> = "ifNoneExist",
    }
}

fhir_element! {
    backbone BundleEntryResponse("Bundle.entry.response") {
        /// Status response code (text optional)
        status: Primitive<FhirString> = "status",
        /// The location (if the operation returns a location)
        location: Primitive<Uri> = "location",
        /// The Etag for the resource (if relevant)
        etag: Primitive<FhirString> = "etag",
        /// Server's date time modified
        last_modified: Primitive<Instant> = "lastModified",
        /// OperationOutcome with hints and warnings (for batch/transaction)
        outcome: Option<Box<Resource>> = "outcome",
    }
}

/// Type of Bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

impl BundleType {
    pub fn as_code(&self) -> &'static str {
        match self {
            BundleType::Document => "document",
            BundleType::Message => "message",
            BundleType::Transaction => "transaction",
            BundleType::TransactionResponse => "transaction-response",
            BundleType::Batch => "batch",
            BundleType::BatchResponse => "batch-response",
            BundleType::History => "history",
            BundleType::Searchset => "searchset",
            BundleType::Collection => "collection",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "document" => BundleType::Document,
            "message" => BundleType::Message,
            "transaction" => BundleType::Transaction,
            "transaction-response" => BundleType::TransactionResponse,
            "batch" => BundleType::Batch,
            "batch-response" => BundleType::BatchResponse,
            "history" => BundleType::History,
            "searchset" => BundleType::Searchset,
            "collection" => BundleType::Collection,
            _ => return None,
        })
    }
}

impl Bundle {
    /// Create a new Bundle with minimal required fields
    pub fn new(bundle_type: BundleType) -> Result<Self> {
        Ok(Self {
            type_: Primitive::new(Code::new(bundle_type.as_code())?),
            ..Default::default()
        })
    }

    pub fn bundle_type(&self) -> Option<BundleType> {
        BundleType::from_code(self.type_.value()?.as_str())
    }

    /// Resources carried by the entries, in order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_deref())
    }

    /// Add a resource as a new entry
    pub fn add_resource(&mut self, full_url: Option<Uri>, resource: impl Into<Resource>) {
        self.entry.push(BundleEntry {
            full_url: full_url.map(Primitive::new).unwrap_or_default(),
            resource: Some(Box::new(resource.into())),
            ..Default::default()
        });
    }
}
