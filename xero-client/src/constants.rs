//! Endpoint roots and fixed protocol parameters for the Xero API

/// Base URL shared by every Xero endpoint.
pub const XERO_BASE_URL: &str = "https://api.xero.com";

/// Root of the accounting API (Contacts, Invoices, Payments, ...).
pub const XERO_API_URL: &str = "https://api.xero.com/api.xro/2.0";

/// Root of the payroll API (Employees, Timesheets, ...).
pub const XERO_PAYROLL_API_URL: &str = "https://api.xero.com/payroll.xro/1.0";

/// Number of records the server returns per page on paginated endpoints.
///
/// Overridable through [`ClientConfig`](crate::ClientConfig) so that the
/// batching driver can be exercised with small pages in tests.
pub const DEFAULT_PAGE_SIZE: usize = 100;
