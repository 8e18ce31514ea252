use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::extract::SessionUser;
use crate::App;

#[doc(hidden)]
#[derive(FromRequestParts)]
pub struct Metadata {
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
}

/// Resolves a bearer token into a [`SessionUser`] request extension.
///
/// Requests without an Authorization header pass through untouched;
/// whether anonymity is acceptable is decided per route by the
/// [`SessionUser`] extractor. A header that fails to resolve is
/// rejected here so no handler ever sees a half-authenticated call.
#[tracing::instrument(skip_all, name = "middleware.auth")]
pub async fn catch_token(
    metadata: Metadata,
    State(app): State<App>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(header) = metadata.auth_header {
        match SessionUser::from_token(&app, header.token()) {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(error) => return error.into_response(),
        }
    }
    next.run(request).await
}
