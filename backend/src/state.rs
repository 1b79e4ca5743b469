//! Shared application state: one store per entity plus the identity
//! client. No record is cached here; every request re-fetches from the
//! provider.

use ledgerpress_shared::contact_store::ContactStore;
use ledgerpress_shared::gallery_store::{BlobClient, GalleryStore};
use ledgerpress_shared::post_store::PostStore;
use ledgerpress_shared::rest::RestClient;

use crate::auth::IdentityClient;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub posts: PostStore,
    pub contacts: ContactStore,
    pub gallery: GalleryStore,
    pub identity: IdentityClient,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let rest = RestClient::new(&config.storage_url, &config.storage_api_key);
        let blob = BlobClient::new(
            &config.storage_blob_url,
            &config.storage_api_key,
            &config.gallery_bucket,
        );

        AppState {
            posts: PostStore::new(rest.clone()),
            contacts: ContactStore::new(rest.clone()),
            gallery: GalleryStore::new(rest, blob),
            identity: IdentityClient::new(&config.identity_url),
        }
    }
}
