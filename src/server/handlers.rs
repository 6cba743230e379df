//! HTML page handlers
//!
//! All handlers run behind the locale middleware and read the page locale
//! from the [`RequestLocale`] extension. Paths seen here carry no locale
//! prefix.

use super::host::SiteHost;
use super::middleware::RequestLocale;
use crate::core::content::{
    ALL_CATEGORIES, Carousel, GalleryCategory, LocalizedProduct, NUTRITION, PRODUCTS,
    search_products, select_gallery_images, select_product,
};
use crate::core::error::{NotFoundError, SiteError};
use crate::core::messages::MessageCatalog;
use crate::core::order::{FieldErrors, FormState, OrderFields, OrderSession};
use crate::core::resolver::prefixed_path;
use axum::extract::{Form, Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Images shown in the home page gallery teaser
const HOME_GALLERY_PREVIEW: usize = 6;

/// Query values are read as text and parsed leniently; a bad value falls
/// back to the default instead of failing the page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub slide: Option<String>,
}

impl HomeQuery {
    /// Slide index, 0 when absent or not a number
    pub fn slide(&self) -> usize {
        self.slide
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// `GET /` — landing page with product carousel and gallery teaser
pub async fn home(
    State(host): State<Arc<SiteHost>>,
    Extension(request): Extension<RequestLocale>,
    Query(query): Query<HomeQuery>,
) -> Response {
    let locale = request.locale;
    let catalog = match host.catalog(locale) {
        Ok(catalog) => catalog,
        Err(e) => return host.error_page(locale, &e),
    };

    let products: Vec<_> = PRODUCTS.iter().map(|p| p.localize(catalog)).collect();
    let carousel = Carousel::at(products.len(), query.slide());
    let preview: Vec<_> = select_gallery_images(ALL_CATEGORIES)
        .take(HOME_GALLERY_PREVIEW)
        .collect();

    let mut context = host.context(locale, &request.path);
    context.insert("products", &products);
    context.insert("active_product", &products.get(carousel.active()));
    context.insert("slide", &carousel.active());
    context.insert("slide_next", &carousel.next_index());
    context.insert("slide_previous", &carousel.previous_index());
    context.insert("gallery", &preview);

    host.page(locale, "home.html", &context)
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /products` — product listing with search
pub async fn products(
    State(host): State<Arc<SiteHost>>,
    Extension(request): Extension<RequestLocale>,
    Query(query): Query<ProductsQuery>,
) -> Response {
    let locale = request.locale;
    let catalog = match host.catalog(locale) {
        Ok(catalog) => catalog,
        Err(e) => return host.error_page(locale, &e),
    };

    let products = search_products(catalog, &query.q);
    tracing::debug!(%locale, query = %query.q, hits = products.len(), "product search");

    let mut context = host.context(locale, &request.path);
    context.insert("products", &products);
    context.insert("query", query.q.trim());

    host.page(locale, "products.html", &context)
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub quantity: Option<String>,
    /// Open the order form
    pub order: Option<String>,
}

impl ProductQuery {
    /// Chosen quantity, clamped to at least 1
    pub fn quantity(&self) -> u32 {
        let Some(raw) = self.quantity.as_deref().map(str::trim) else {
            return 1;
        };
        match raw.parse::<i64>() {
            Ok(quantity) => quantity.clamp(1, i64::from(u32::MAX)) as u32,
            Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => u32::MAX,
            Err(_) => 1,
        }
    }

    /// `?order` opens the form unless it is explicitly `false` or `0`
    pub fn order_open(&self) -> bool {
        self.order
            .as_deref()
            .is_some_and(|raw| !matches!(raw.trim(), "false" | "0"))
    }
}

/// Order form as shown on a product page
#[derive(Debug, Serialize)]
struct FormView {
    open: bool,
    fields: OrderFields,
    errors: BTreeMap<&'static str, String>,
    failure: Option<String>,
}

impl FormView {
    fn closed(session: &OrderSession) -> Self {
        Self {
            open: false,
            fields: session.fields().clone(),
            errors: BTreeMap::new(),
            failure: None,
        }
    }

    fn from_session(session: &OrderSession, catalog: &MessageCatalog) -> Self {
        let failure = match session.state() {
            FormState::Failed { .. } => Some(catalog.lookup("OrderForm.errors.submitFailed")),
            _ => None,
        };
        Self {
            open: true,
            fields: session.fields().clone(),
            errors: translate_errors(session.errors(), catalog),
            failure,
        }
    }
}

fn translate_errors(
    errors: &FieldErrors,
    catalog: &MessageCatalog,
) -> BTreeMap<&'static str, String> {
    errors
        .iter()
        .map(|(field, key)| (field.as_str(), catalog.lookup(key)))
        .collect()
}

/// `GET /products/{slug}` — product detail; unknown slugs go back to the listing
pub async fn product(
    State(host): State<Arc<SiteHost>>,
    Extension(request): Extension<RequestLocale>,
    Path(slug): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let locale = request.locale;
    let product = match select_product(&slug) {
        Ok(product) => product,
        Err(e) => {
            tracing::debug!(%locale, error = %e, "redirecting to product listing");
            return Redirect::to(&prefixed_path(locale, "/products")).into_response();
        }
    };
    let catalog = match host.catalog(locale) {
        Ok(catalog) => catalog,
        Err(e) => return host.error_page(locale, &e),
    };

    let localized = product.localize(catalog);
    let session = OrderSession::new(localized.name.clone(), query.quantity());
    let mut form = FormView::closed(&session);
    form.open = query.order_open();

    product_page(&host, &request, &localized, &session, form, StatusCode::OK)
}

/// `POST /products/{slug}/order` — validate and submit the order form
pub async fn order(
    State(host): State<Arc<SiteHost>>,
    Extension(request): Extension<RequestLocale>,
    Path(slug): Path<String>,
    Form(fields): Form<OrderFields>,
) -> Response {
    let locale = request.locale;
    let product = match select_product(&slug) {
        Ok(product) => product,
        Err(_) => {
            return Redirect::to(&prefixed_path(locale, "/products")).into_response();
        }
    };
    let catalog = match host.catalog(locale) {
        Ok(catalog) => catalog,
        Err(e) => return host.error_page(locale, &e),
    };
    let localized = product.localize(catalog);

    let mut session = OrderSession::new(localized.name.clone(), 1);
    session.fill(fields);
    session.submit(host.intake.as_ref()).await;

    match session.state().clone() {
        FormState::Success { receipt } => {
            let mut context = host.context(locale, &request.path);
            context.insert("product", &localized);
            context.insert("quantity", &session.quantity());
            context.insert("reference", &receipt.reference.to_string());
            host.page(locale, "order_success.html", &context)
        }
        FormState::Failed { .. } => {
            let form = FormView::from_session(&session, catalog);
            product_page(&host, &request, &localized, &session, form, StatusCode::BAD_GATEWAY)
        }
        FormState::Idle | FormState::Submitting => {
            let form = FormView::from_session(&session, catalog);
            product_page(
                &host,
                &request,
                &localized,
                &session,
                form,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
    }
}

fn product_page(
    host: &SiteHost,
    request: &RequestLocale,
    product: &LocalizedProduct,
    session: &OrderSession,
    form: FormView,
    status: StatusCode,
) -> Response {
    let mut fewer = session.clone();
    fewer.decrease_quantity();
    let mut more = session.clone();
    more.increase_quantity();

    // Form posts go to `/products/{slug}/order`; the page itself lives one level up
    let page_path = format!("/products/{}", product.slug);

    let mut context = host.context(request.locale, &page_path);
    context.insert("product", product);
    context.insert("nutrition", &NUTRITION);
    context.insert("quantity", &session.quantity());
    context.insert("quantity_less", &fewer.quantity());
    context.insert("quantity_more", &more.quantity());
    context.insert("form", &form);

    host.page_with_status(request.locale, status, "product.html", &context)
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    #[serde(default = "all_categories")]
    pub category: String,
}

fn all_categories() -> String {
    ALL_CATEGORIES.to_string()
}

/// Entry of the gallery category filter
#[derive(Debug, Serialize)]
struct CategoryFilter {
    name: &'static str,
    active: bool,
}

/// `GET /gallery` — photo gallery filtered by `?category=`
pub async fn gallery(
    State(host): State<Arc<SiteHost>>,
    Extension(request): Extension<RequestLocale>,
    Query(query): Query<GalleryQuery>,
) -> Response {
    let locale = request.locale;
    let images: Vec<_> = select_gallery_images(&query.category).collect();

    let filters: Vec<CategoryFilter> = std::iter::once(ALL_CATEGORIES)
        .chain(GalleryCategory::ALL.iter().map(|c| c.as_str()))
        .map(|name| CategoryFilter {
            name,
            active: name == query.category,
        })
        .collect();

    let mut context = host.context(locale, &request.path);
    context.insert("images", &images);
    context.insert("categories", &filters);
    context.insert("category", &query.category);

    host.page(locale, "gallery.html", &context)
}

/// Anything the page router does not know
pub async fn not_found(
    State(host): State<Arc<SiteHost>>,
    request: Option<Extension<RequestLocale>>,
    uri: Uri,
) -> Response {
    let locale = request
        .map(|Extension(r)| r.locale)
        .unwrap_or_else(|| host.registry().default_locale());
    let err = SiteError::NotFound(NotFoundError::UnknownRoute {
        path: uri.path().to_string(),
    });
    host.error_page(locale, &err)
}
