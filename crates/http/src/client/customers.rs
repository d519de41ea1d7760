//! Customer API client methods

use super::request::RequestDescriptor;
use super::{ClientError, VetoClient};
use tracing::info;
use vetogest_core::Customer;

/// Customer collection endpoint
pub const CUSTOMERS_PATH: &str = "/customers/";

impl VetoClient {
    /// Create a customer, returning the stored record with its id and timestamps
    pub async fn create_customer(&self, customer: &Customer) -> Result<Customer, ClientError> {
        let descriptor = RequestDescriptor::post(CUSTOMERS_PATH).json(customer)?;
        let created: Customer = self.execute(&descriptor).await?;
        info!(id = created.id, "Customer created");
        Ok(created)
    }
}
