pub mod client;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod result;
pub mod shape;

pub use client::{BigQueryClient, QueryService};
pub use credentials::{
    AccessToken, CredentialProvider, MetadataServerCredentials, StaticCredentials, BIGQUERY_SCOPE,
};
pub use error::BigQueryError;
pub use executor::QueryExecutor;
pub use result::{
    DatasetList, QueryRequest, QueryResponse, ShapedResult, ShapedRow, TableCell,
    TableFieldSchema, TableRow, TableSchema,
};
pub use shape::shape;
