//! AWS Lambda function relaying contact-form submissions as email.

use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    portfolio_lambda_contact::run().await
}
