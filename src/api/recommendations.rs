use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use axum_extra::extract::cookie::CookieJar;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    Res,
    api::{AppState, existing_session},
    error::AppError,
    management::{DEFAULT_RECOMMENDATION_COUNT, run_authorized, validate_count},
    types::RecommendationCard,
    vinyl,
};

/// Form of the recommendation card.
#[derive(Debug, Default)]
pub struct RecommendationForm {
    pub name: String,
    pub count: u8,
    pub image: Vec<u8>,
}

impl RecommendationForm {
    /// Reads and validates the multipart fields `name`, `count` and `image`.
    pub async fn from_multipart(mut multipart: Multipart) -> Res<Self> {
        let mut name = None;
        let mut count = None;
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("invalid form data: {e}")))?
        {
            let field_name = field.name().map(str::to_string);
            match field_name.as_deref() {
                Some("name") => name = Some(read_text(field).await?),
                Some("count") => count = Some(read_text(field).await?),
                Some("image") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("invalid image upload: {e}")))?;
                    image = Some(bytes.to_vec());
                }
                _ => {}
            }
        }

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::validation("Please enter a playlist name."))?;

        let image = image
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| AppError::validation("Please upload an image for the playlist."))?;

        let count = match count.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_RECOMMENDATION_COUNT,
            Some(raw) => raw
                .parse::<u8>()
                .map_err(|_| AppError::validation(format!("invalid number of songs '{raw}'")))?,
        };

        Ok(Self {
            name,
            count: validate_count(count)?,
            image,
        })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Res<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("invalid form field: {e}")))
}

/// Builds the recommendation card: vinyl cover, playlist name and songs.
///
/// The form and the image are validated before any call to the streaming
/// service is made.
pub async fn recommendations(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(playlist_id): Path<String>,
    multipart: Multipart,
) -> Res<Json<RecommendationCard>> {
    let session = existing_session(&state, &jar).await?;
    let form = RecommendationForm::from_multipart(multipart).await?;

    let image = form.image;
    let cover = tokio::task::spawn_blocking(move || vinyl::render_png(&image))
        .await
        .map_err(|e| AppError::Io(std::io::Error::other(e)))??;

    let count = form.count;
    let songs = run_authorized(&session, |token, _| async move {
        let tracks = state.streaming.playlist_tracks(&token, &playlist_id).await?;
        state.recommender.recommend(&token, &tracks, count).await
    })
    .await?;

    Ok(Json(RecommendationCard {
        name: form.name,
        cover_png_base64: STANDARD.encode(cover),
        songs,
    }))
}
