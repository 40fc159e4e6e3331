pub mod lambda_trait;
