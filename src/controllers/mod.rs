use std::sync::Arc;

use futures::Future;
use mobc::Pool;
use url::Url;
use warp::{filters::BoxedFilter, Filter};

use crate::{configuration::Configuration, connection_pool, media::MediaStore};

pub mod books;
pub mod maintenance;

/// Scheme and host the current request was addressed to.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

/// Absolute URLs for stored media, rooted at the requesting host.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaLinks {
    base: Url,
}

impl MediaLinks {
    pub fn new(origin: &RequestOrigin, media: &MediaStore) -> Result<Self, url::ParseError> {
        let root = Url::parse(&format!("{}://{}/", origin.scheme, origin.host))?;
        // Only a bare host[:port]; no userinfo or path.
        if root.host_str().map_or(true, str::is_empty)
            || root.path() != "/"
            || !root.username().is_empty()
            || root.password().is_some()
        {
            return Err(url::ParseError::InvalidDomainCharacter);
        }
        Ok(MediaLinks {
            base: root.join(media.url_prefix())?,
        })
    }

    pub fn absolute(&self, stored_name: &str) -> Result<String, url::ParseError> {
        Ok(self
            .base
            .join(stored_name.trim_start_matches('/'))?
            .to_string())
    }
}

/// Falls back to the bind address when a request carries no Host header.
pub fn request_origin(scheme: String, fallback_host: String) -> BoxedFilter<(RequestOrigin,)> {
    warp::header::optional::<String>("host")
        .map(move |host: Option<String>| RequestOrigin {
            scheme: scheme.clone(),
            host: host.unwrap_or_else(|| fallback_host.clone()),
        })
        .boxed()
}

/// Serves the media root read-only under the media URL prefix.
pub fn media_files(media: &MediaStore) -> BoxedFilter<(warp::fs::File,)> {
    let prefix = media
        .url_prefix()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .fold(warp::any().boxed(), |filter, segment| {
            filter.and(warp::path(segment)).boxed()
        });
    warp::get()
        .and(prefix)
        .and(warp::fs::dir(media.root().to_path_buf()))
        .boxed()
}

pub fn get_server_future(
    pool: &Pool<connection_pool::PgConnectionManager>,
    config: &Configuration,
) -> impl Future<Output = ()> {
    let media = Arc::new(MediaStore::new(&config.media));
    let origin = request_origin(
        config.media.public_scheme.clone(),
        config.bind_address.to_string(),
    );

    let book_routes = books::get_filters(pool.clone(), media.clone(), origin);
    let maintenance_routes = maintenance::get_filters(pool.clone(), media.clone());
    let media_routes = media_files(&media);

    warp::serve(
        book_routes
            .or(maintenance_routes)
            .or(media_routes)
            .with(warp::trace::request()),
    )
    .run(config.bind_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MediaConfiguration;

    fn media(root: &std::path::Path) -> MediaStore {
        MediaStore::new(&MediaConfiguration {
            root: root.to_path_buf(),
            ..MediaConfiguration::default()
        })
    }

    fn origin(host: &str) -> RequestOrigin {
        RequestOrigin {
            scheme: "http".into(),
            host: host.into(),
        }
    }

    #[test]
    fn media_links_are_rooted_at_the_request_host() {
        let links = MediaLinks::new(&origin("books.example.com:8000"), &media("media".as_ref()))
            .unwrap();
        assert_eq!(
            links.absolute("formats/sample_0.pdf").unwrap(),
            "http://books.example.com:8000/media/formats/sample_0.pdf"
        );
        assert_eq!(
            links.absolute("formats/my book.pdf").unwrap(),
            "http://books.example.com:8000/media/formats/my%20book.pdf"
        );
    }

    #[test]
    fn malformed_hosts_are_rejected() {
        let media = media("media".as_ref());
        assert!(MediaLinks::new(&origin("bad host"), &media).is_err());
        assert!(MediaLinks::new(&origin("example.com/elsewhere"), &media).is_err());
        assert!(MediaLinks::new(&origin(""), &media).is_err());
    }

    #[test]
    fn hosts_with_userinfo_are_rejected() {
        let media = media("media".as_ref());
        assert!(MediaLinks::new(&origin("catalog.local@evil.example"), &media).is_err());
        assert!(MediaLinks::new(&origin("user:secret@catalog.local"), &media).is_err());
        assert!(MediaLinks::new(&origin("catalog.local:8000"), &media).is_ok());
    }

    #[tokio::test]
    async fn origin_prefers_the_host_header() {
        let filter = request_origin("http".into(), "0.0.0.0:3000".into());

        let with_header = warp::test::request()
            .header("host", "catalog.local")
            .filter(&filter)
            .await
            .unwrap();
        assert_eq!(with_header, origin("catalog.local"));

        let without_header = warp::test::request().filter(&filter).await.unwrap();
        assert_eq!(without_header, origin("0.0.0.0:3000"));
    }

    #[tokio::test]
    async fn media_files_are_served_under_the_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("formats")).unwrap();
        std::fs::write(dir.path().join("formats/sample_0.pdf"), b"%PDF-1.4").unwrap();
        let filter = media_files(&media(dir.path()));

        let found = warp::test::request()
            .path("/media/formats/sample_0.pdf")
            .reply(&filter)
            .await;
        assert_eq!(found.status(), 200);
        assert_eq!(found.body().as_ref(), b"%PDF-1.4");

        let outside = warp::test::request()
            .path("/formats/sample_0.pdf")
            .reply(&filter)
            .await;
        assert_eq!(outside.status(), 404);
    }
}
