use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::products::list_products,
        api::products::create_product,
        api::products::update_product,
        api::products::delete_product,
        api::suppliers::list_suppliers,
        api::suppliers::create_supplier,
        api::markets::list_markets,
        api::markets::delete_market,
        api::import::import_products_file,
        // Add other endpoints here as we document them
    ),
    components(
        schemas(
            // We will need to derive ToSchema for our models
        )
    ),
    tags(
        (name = "etal", description = "Étal stock and catalogue API")
    )
)]
pub struct ApiDoc;
