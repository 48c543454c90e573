//! Sequential batch execution.
//!
//! # Design
//! Items run strictly one after another: item `i + 1` is not built until item
//! `i` has been sent and interpreted, so side effects reach the provider in
//! submission order (messages arrive in the order they were queued). The only
//! suspension point per item is the transport call.

use tracing::{debug, error, warn};

use crate::client::AvisaClient;
use crate::config::{BatchOptions, ClientConfig};
use crate::credentials::CredentialProvider;
use crate::error::{AvisaError, BatchError};
use crate::operation::OperationKey;
use crate::params::ItemParameters;
use crate::record::ResultRecord;
use crate::transport::Transport;

/// Runs every item of one batch against a single operation.
pub struct BatchExecutor<'a, T: ?Sized> {
    client: &'a AvisaClient,
    transport: &'a T,
    options: BatchOptions,
}

impl<'a, T: Transport + ?Sized> BatchExecutor<'a, T> {
    pub fn new(client: &'a AvisaClient, transport: &'a T, options: BatchOptions) -> Self {
        Self {
            client,
            transport,
            options,
        }
    }

    /// One record per item, in input order.
    ///
    /// Without `continue_on_failure` the first fatal item error aborts the
    /// batch and no records are returned.
    pub async fn run(
        &self,
        key: OperationKey,
        items: &[ItemParameters],
    ) -> Result<Vec<ResultRecord>, BatchError> {
        let mut records = Vec::with_capacity(items.len());
        for (index, params) in items.iter().enumerate() {
            match self.run_item(key, params).await {
                Ok(record) => records.push(record),
                Err(err) if self.options.continue_on_failure => {
                    warn!(operation = %key, index, error = %err, "item failed, continuing");
                    records.push(ResultRecord::error_placeholder(err.to_string()));
                }
                Err(err) => {
                    error!(operation = %key, index, error = %err, "item failed, aborting batch");
                    return Err(BatchError::Item { index, source: err });
                }
            }
        }
        debug!(operation = %key, items = records.len(), "batch complete");
        Ok(records)
    }

    async fn run_item(
        &self,
        key: OperationKey,
        params: &ItemParameters,
    ) -> Result<ResultRecord, AvisaError> {
        let request = self.client.build_item(key, params)?;
        let outcome = self.transport.send(&request).await;
        self.client.interpret(key, outcome)
    }
}

/// Resolve credentials once and run the whole batch with them.
pub async fn dispatch<P, T>(
    provider: &P,
    transport: &T,
    config: ClientConfig,
    key: OperationKey,
    items: &[ItemParameters],
    options: BatchOptions,
) -> Result<Vec<ResultRecord>, BatchError>
where
    P: CredentialProvider + ?Sized,
    T: Transport + ?Sized,
{
    let credentials = provider
        .credentials()
        .await
        .map_err(BatchError::Credentials)?;
    let client = AvisaClient::with_config(&credentials, config);
    BatchExecutor::new(&client, transport, options)
        .run(key, items)
        .await
}
