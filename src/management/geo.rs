use std::sync::Arc;

use futures::{StreamExt, stream};

use crate::{
    Res,
    geocoding::Geocoder,
    management::SessionCaches,
    musicbrainz::ArtistLocator,
    types::{Artist, Coordinates, MapMarker},
};

/// Resolves artists to map markers: name -> origin city -> coordinates.
#[derive(Clone)]
pub struct GeoResolver {
    locator: Arc<dyn ArtistLocator>,
    geocoder: Arc<dyn Geocoder>,
    concurrency: usize,
}

impl GeoResolver {
    pub fn new(
        locator: Arc<dyn ArtistLocator>,
        geocoder: Arc<dyn Geocoder>,
        concurrency: usize,
    ) -> Self {
        Self {
            locator,
            geocoder,
            concurrency: concurrency.max(1),
        }
    }

    /// Markers for every artist that resolves, in input order.
    ///
    /// An artist that cannot be resolved is logged and left out; it never
    /// stops the others from resolving.
    pub async fn resolve(&self, artists: &[Artist], caches: &SessionCaches) -> Vec<MapMarker> {
        let lookups: Vec<_> = artists
            .iter()
            .map(|artist| {
                let resolver = self.clone();
                let caches = caches.clone();
                let name = artist.name.clone();
                async move { resolver.resolve_artist(&name, &caches).await }
            })
            .collect();

        let markers: Vec<Option<MapMarker>> = stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await;
        markers.into_iter().flatten().collect()
    }

    async fn resolve_artist(&self, name: &str, caches: &SessionCaches) -> Option<MapMarker> {
        let city = match self.origin(name, caches).await {
            Ok(Some(city)) => city,
            Ok(None) => {
                tracing::info!(artist = %name, "No origin city found");
                return None;
            }
            Err(e) => {
                tracing::warn!(artist = %name, error = %e, "Artist origin lookup failed");
                return None;
            }
        };

        match self.coordinates(&city, caches).await {
            Ok(Some(coordinates)) => Some(MapMarker::new(name, &city, coordinates)),
            Ok(None) => {
                tracing::info!(artist = %name, city = %city, "No geocoding result");
                None
            }
            Err(e) => {
                tracing::warn!(artist = %name, city = %city, error = %e, "Geocoding failed");
                None
            }
        }
    }

    async fn origin(&self, name: &str, caches: &SessionCaches) -> Res<Option<String>> {
        caches
            .origins
            .get_or_try_insert_with(name.to_string(), || self.locator.artist_origin(name))
            .await
    }

    async fn coordinates(&self, city: &str, caches: &SessionCaches) -> Res<Option<Coordinates>> {
        caches
            .coordinates
            .get_or_try_insert_with(city.to_string(), || self.geocoder.geocode(city))
            .await
    }
}
