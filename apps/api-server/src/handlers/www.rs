//! Front-end site.

use actix_web::{HttpRequest, HttpResponse, web};

use crate::state::AppState;

/// GET / - landing page linking to the api and admin hosts.
pub async fn landing(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let scheme = req.connection_info().scheme().to_string();
    let domain = &state.site_domain;
    let name = &state.site_name;

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{name}</title></head>
<body>
<h1>{name}</h1>
<ul>
<li><a href="{scheme}://api.{domain}/api/">API</a></li>
<li><a href="{scheme}://admin.{domain}/admin/">Admin</a></li>
</ul>
</body>
</html>
"#
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
