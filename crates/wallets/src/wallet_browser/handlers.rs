use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse},
};

use crate::wallet_browser::{
    app::contents,
    state::BrowserWalletState,
    types::{
        AccountsRequest, AccountsResponse, BrowserApiResponse, BrowserTransaction, Connection,
        ProviderStatus, TransactionResponse,
    },
};

pub(crate) async fn serve_index(State(state): State<Arc<BrowserWalletState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    (headers, Html(contents::index_html(&state.session_token())))
}

pub(crate) async fn post_provider_status(
    State(state): State<Arc<BrowserWalletState>>,
    Json(status): Json<ProviderStatus>,
) -> Json<BrowserApiResponse<()>> {
    debug!(target: "wallets::browser", installed = status.installed, "provider status");
    state.set_installed(status.installed);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_next_accounts_request(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<AccountsRequest>> {
    match state.read_next_accounts_request() {
        Some(request) => Json(BrowserApiResponse::Ok(request)),
        None => Json(BrowserApiResponse::error("No pending account request")),
    }
}

pub(crate) async fn post_accounts_response(
    State(state): State<Arc<BrowserWalletState>>,
    Json(response): Json<AccountsResponse>,
) -> Json<BrowserApiResponse<()>> {
    if !state.has_accounts_request(&response.id) {
        return Json(BrowserApiResponse::error("Unknown account request id"));
    }
    state.add_accounts_response(response);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_next_transaction_request(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<BrowserTransaction>> {
    match state.read_next_transaction_request() {
        Some(tx) => Json(BrowserApiResponse::Ok(tx)),
        None => Json(BrowserApiResponse::error("No pending transaction")),
    }
}

pub(crate) async fn post_transaction_response(
    State(state): State<Arc<BrowserWalletState>>,
    Json(response): Json<TransactionResponse>,
) -> Json<BrowserApiResponse<()>> {
    if !state.has_transaction_request(&response.id) {
        return Json(BrowserApiResponse::error("Unknown transaction id"));
    }
    state.add_transaction_response(response);
    Json(BrowserApiResponse::Ok(()))
}

pub(crate) async fn get_connection_info(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<Option<Connection>>> {
    Json(BrowserApiResponse::Ok(state.get_connection()))
}

pub(crate) async fn post_connection_update(
    State(state): State<Arc<BrowserWalletState>>,
    Json(connection): Json<Option<Connection>>,
) -> Json<BrowserApiResponse<()>> {
    debug!(target: "wallets::browser", ?connection, "connection update");
    state.set_connection(connection);
    Json(BrowserApiResponse::Ok(()))
}
