//! Client construction and per-entity access
//!
//! The client binds a signer, a transport and an immutable configuration,
//! and hands out [`Manager`]s for the resource collections the API exposes.
//! Named accessors cover the documented accounting and payroll resources;
//! `manager()` is the escape hatch for anything newer than this crate.

use std::sync::Arc;

use crate::constants::{DEFAULT_PAGE_SIZE, XERO_API_URL, XERO_PAYROLL_API_URL};
use crate::credentials::RequestSigner;
use crate::manager::Manager;
use crate::tables::MarshalTables;
use crate::transport::{HttpTransport, Transport};

/// Immutable client configuration with a builder, covering everything that
/// varies per deployment: endpoint roots, the marshalling tables and the
/// page size used by the batching driver.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the accounting API.
    pub base_url: String,
    /// Root of the payroll API.
    pub payroll_url: String,
    /// Page size assumed by [`Manager::all`]. The server's page size is
    /// fixed; this knob exists so the batching driver can be tested with
    /// small pages.
    pub page_size: usize,
    /// Request the structured (JSON) representation by default. The decoder
    /// handles whichever representation the server actually returns.
    pub prefer_json: bool,
    /// Field coercion sets, plural exceptions, never-send and collection
    /// field tables.
    pub tables: MarshalTables,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: XERO_API_URL.to_string(),
            payroll_url: XERO_PAYROLL_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            prefer_json: true,
            tables: MarshalTables::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for ClientConfig
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Override the accounting API root
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Override the payroll API root
    pub fn payroll_url(mut self, url: impl Into<String>) -> Self {
        self.config.payroll_url = url.into();
        self
    }

    /// Override the batching page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Request the structured representation by default or not
    pub fn prefer_json(mut self, prefer: bool) -> Self {
        self.config.prefer_json = prefer;
        self
    }

    /// Replace the marshalling tables wholesale
    pub fn tables(mut self, tables: MarshalTables) -> Self {
        self.config.tables = tables;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Entry point to the API: a signer, a transport and a configuration.
#[derive(Clone)]
pub struct Client {
    signer: Arc<dyn RequestSigner>,
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Client over the default HTTP transport and configuration.
    pub fn new(signer: impl RequestSigner + 'static) -> Self {
        Self::with_transport(
            Arc::new(signer),
            Arc::new(HttpTransport::default()),
            ClientConfig::default(),
        )
    }

    /// Client over the default HTTP transport with a custom configuration.
    pub fn with_config(signer: impl RequestSigner + 'static, config: ClientConfig) -> Self {
        Self::with_transport(Arc::new(signer), Arc::new(HttpTransport::default()), config)
    }

    /// Fully custom client; the transport seam is what tests hook into.
    pub fn with_transport(
        signer: Arc<dyn RequestSigner>,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> Self {
        Self {
            signer,
            transport,
            config: Arc::new(config),
        }
    }

    /// Manager for an arbitrary accounting resource collection.
    pub fn manager(&self, name: impl Into<String>) -> Manager {
        Manager::new(
            name,
            self.config.base_url.clone(),
            self.signer.clone(),
            self.transport.clone(),
            self.config.clone(),
        )
    }

    /// Manager for an arbitrary payroll resource collection.
    pub fn payroll_manager(&self, name: impl Into<String>) -> Manager {
        Manager::new(
            name,
            self.config.payroll_url.clone(),
            self.signer.clone(),
            self.transport.clone(),
            self.config.clone(),
        )
    }

    // Accounting resources.

    pub fn contacts(&self) -> Manager {
        self.manager("Contacts")
    }

    pub fn accounts(&self) -> Manager {
        self.manager("Accounts")
    }

    pub fn credit_notes(&self) -> Manager {
        self.manager("CreditNotes")
    }

    pub fn currencies(&self) -> Manager {
        self.manager("Currencies")
    }

    pub fn invoices(&self) -> Manager {
        self.manager("Invoices")
    }

    pub fn organisations(&self) -> Manager {
        self.manager("Organisations")
    }

    pub fn payments(&self) -> Manager {
        self.manager("Payments")
    }

    pub fn tax_rates(&self) -> Manager {
        self.manager("TaxRates")
    }

    pub fn tracking_categories(&self) -> Manager {
        self.manager("TrackingCategories")
    }

    // Payroll resources.

    pub fn employees(&self) -> Manager {
        self.payroll_manager("Employees")
    }

    pub fn leave_applications(&self) -> Manager {
        self.payroll_manager("LeaveApplications")
    }

    pub fn pay_items(&self) -> Manager {
        self.payroll_manager("PayItems")
    }

    pub fn payroll_calendars(&self) -> Manager {
        self.payroll_manager("PayrollCalendars")
    }

    pub fn pay_runs(&self) -> Manager {
        self.payroll_manager("PayRuns")
    }

    pub fn payslip(&self) -> Manager {
        self.payroll_manager("Payslip")
    }

    pub fn super_funds(&self) -> Manager {
        self.payroll_manager("SuperFunds")
    }

    pub fn super_fund_products(&self) -> Manager {
        self.payroll_manager("SuperFundProducts")
    }

    pub fn timesheets(&self) -> Manager {
        self.payroll_manager("Timesheets")
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticTokenSigner;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, XERO_API_URL);
        assert_eq!(config.payroll_url, XERO_PAYROLL_API_URL);
        assert_eq!(config.page_size, 100);
        assert!(config.prefer_json);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::builder()
            .base_url("https://sandbox.example.com/api.xro/2.0")
            .page_size(10)
            .prefer_json(false)
            .build();
        assert_eq!(config.base_url, "https://sandbox.example.com/api.xro/2.0");
        assert_eq!(config.page_size, 10);
        assert!(!config.prefer_json);
    }

    #[test]
    fn test_managers_bind_names_and_roots() {
        let client = Client::new(StaticTokenSigner::new("secret"));
        let invoices = client.invoices();
        assert_eq!(invoices.name(), "Invoices");
        assert_eq!(invoices.singular(), "Invoice");
        let timesheets = client.timesheets();
        assert_eq!(timesheets.name(), "Timesheets");
    }
}
