use derive_more::{Display, Error, From};

use crate::media;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    #[display(fmt = "EstablishConnection: {}", _0)]
    EstablishConnection(mobc::Error<diesel::ConnectionError>),
    #[display(fmt = "QueryResult: {}", _0)]
    QueryResult(diesel::result::Error),
    #[display(fmt = "Media: {}", _0)]
    Media(media::Error),
}
