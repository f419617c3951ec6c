//! Static marshalling tables
//!
//! The wire format carries no schema, so decoding leans entirely on field
//! *names*: membership in the coercion sets below picks the target scalar
//! type, the plural-exception table steers singular-form derivation, and the
//! never-send set lists server-computed fields that must not appear in
//! outbound documents. The defaults match the remote schema as of this
//! writing; all of them can be overridden per deployment through
//! [`ClientConfig`](crate::ClientConfig) since the remote schema evolves.

use std::collections::{HashMap, HashSet};

use crate::coerce::CoercionRule;
use crate::pluralization;

const DECIMAL_FIELDS: &[&str] = &[
    "UnitAmount",
    "TaxAmount",
    "LineAmount",
    "SubTotal",
    "TotalTax",
    "Total",
    "AmountDue",
    "AmountPaid",
    "AmountCredited",
    "CurrencyRate",
    "DiscountRate",
    "Quantity",
    "Hours",
    "NumberOfUnit",
];

const BOOLEAN_FIELDS: &[&str] = &[
    "IsSupplier",
    "IsCustomer",
    "IsDemoCompany",
    "PaysTax",
    "IsReconciled",
    "EnablePaymentsToAccount",
    "ShowInExpenseClaims",
    "IncludeInEmails",
    "SentToContact",
    "HasAttachments",
    "HasValidationErrors",
];

const DATETIME_FIELDS: &[&str] = &[
    "UpdatedDateUTC",
    "CreatedDateUTC",
    "DateTimeUTC",
    "Updated",
    "FullyPaidOnDate",
];

const DATE_FIELDS: &[&str] = &[
    "Date",
    "DueDate",
    "PaymentDate",
    "StartDate",
    "EndDate",
    "PeriodLockDate",
    "DateOfBirth",
    "OpeningBalanceDate",
    "PaymentDueDate",
    "ReportingDate",
    "DeliveryDate",
    "ExpectedArrivalDate",
];

const INTEGER_FIELDS: &[&str] = &["FinancialYearEndDay", "FinancialYearEndMonth", "DecimalPlaces"];

/// Fields that must never be sent back to the server.
const NO_SEND_FIELDS: &[&str] = &["UpdatedDateUTC"];

/// Plural-wrapped fields that must decode as lists even when the wrapper
/// element arrives empty and the shape heuristics cannot tell.
const COLLECTION_FIELDS: &[&str] = &["Addresses", "Phones", "ContactPersons", "LineItems"];

/// Immutable marshalling configuration consumed by the decoder, encoder and
/// filter generator. Construct once, share freely; there is no global state.
#[derive(Debug, Clone)]
pub struct MarshalTables {
    pub decimal_fields: HashSet<String>,
    pub boolean_fields: HashSet<String>,
    pub datetime_fields: HashSet<String>,
    pub date_fields: HashSet<String>,
    pub integer_fields: HashSet<String>,
    /// Irregular plural stems, applied after stripping the trailing `s`
    /// ("Addresse" → "Address"). Shared by decoding and encoding so the two
    /// directions cannot drift apart.
    pub plural_exceptions: HashMap<String, String>,
    pub never_send: HashSet<String>,
    pub collection_fields: HashSet<String>,
}

impl Default for MarshalTables {
    fn default() -> Self {
        fn set(names: &[&str]) -> HashSet<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            decimal_fields: set(DECIMAL_FIELDS),
            boolean_fields: set(BOOLEAN_FIELDS),
            datetime_fields: set(DATETIME_FIELDS),
            date_fields: set(DATE_FIELDS),
            integer_fields: set(INTEGER_FIELDS),
            plural_exceptions: HashMap::from([("Addresse".to_string(), "Address".to_string())]),
            never_send: set(NO_SEND_FIELDS),
            collection_fields: set(COLLECTION_FIELDS),
        }
    }
}

impl MarshalTables {
    /// Resolve the coercion rule for a field name.
    ///
    /// Exact-name membership wins; any remaining name ending in `ID` is
    /// treated as a GUID; everything else is left untouched.
    pub fn resolve(&self, field: &str) -> CoercionRule {
        if self.decimal_fields.contains(field) {
            CoercionRule::Decimal
        } else if self.boolean_fields.contains(field) {
            CoercionRule::Boolean
        } else if self.datetime_fields.contains(field) {
            CoercionRule::DateTime
        } else if self.date_fields.contains(field) {
            CoercionRule::Date
        } else if self.integer_fields.contains(field) {
            CoercionRule::Integer
        } else if field.ends_with("ID") {
            CoercionRule::Guid
        } else {
            CoercionRule::None
        }
    }

    /// Singular form of an entity or field name, honoring the exceptions.
    pub fn singularize(&self, word: &str) -> String {
        pluralization::singularize(word, &self.plural_exceptions)
    }

    /// Whether a field is excluded from outbound documents.
    pub fn is_never_send(&self, field: &str) -> bool {
        self.never_send.contains(field)
    }

    /// Whether a field always decodes as a list.
    pub fn is_collection(&self, field: &str) -> bool {
        self.collection_fields.contains(field)
    }
}
