//! AWS Lambda function proxying requests to an API-key-protected endpoint.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    portfolio_lambda_proxy::run().await
}
