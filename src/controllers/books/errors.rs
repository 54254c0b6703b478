use derive_more::{Display, Error, From};

use super::params::InvalidParameter;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    #[display(fmt = "EstablishConnection: {}", _0)]
    EstablishConnection(mobc::Error<diesel::ConnectionError>),
    #[display(fmt = "QueryResult: {}", _0)]
    QueryResult(diesel::result::Error),
    #[display(fmt = "InvalidParameter: {}", _0)]
    InvalidParameter(InvalidParameter),
    #[display(fmt = "InvalidHost: {}", _0)]
    InvalidHost(url::ParseError),
}
