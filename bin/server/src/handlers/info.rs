use crate::state::AppState;
use actix_web::{get, web, HttpRequest, HttpResponse};
use common::identity::identity_from_peer;
use common::{MyIpResponse, ServerInfoResponse};

/// The caller's identity as the server sees it
#[get("/api/my-ip")]
pub async fn my_ip(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(MyIpResponse {
        ip: identity_from_peer(req.peer_addr()),
    })
}

/// Address to share with other devices
#[get("/api/server-info")]
pub async fn server_info(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let conn = req.connection_info();
    let host = conn.host().to_string();
    let protocol = conn.scheme().to_string();
    let url = state
        .public_url
        .clone()
        .unwrap_or_else(|| format!("{}://{}", protocol, host));

    HttpResponse::Ok().json(ServerInfoResponse {
        url,
        host,
        protocol,
    })
}
