use ntex::web;

/// Configures the Interakt webhook routes.
///
/// These are public endpoints; authenticity is checked per request through
/// the optional HMAC signature header.
///
/// # Routes
/// - `POST /interakt/webhook` - Interakt event receiver
pub fn interakt(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/interakt").service((super::interakt::receive,)));
}
