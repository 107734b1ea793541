//! The fixed route table of the construction stages API.

use http::{Method, StatusCode};

use stages_docs::{schemas, EndpointDoc, OpenApi, OpenApiGenerator, ResponseBody};
use stages_router::{Router, RouterError};

/// The operations the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET constructionStages`
    ListStages,
    /// `GET constructionStages/(:num)`
    GetStage,
    /// `POST constructionStages`
    CreateStage,
    /// `PATCH constructionStages/(:num)`
    UpdateStage,
    /// `DELETE constructionStages/(:num)`
    DeleteStage,
}

const COLLECTION: &str = "constructionStages";
const ITEM: &str = "constructionStages/(:num)";
const TAG: &str = "constructionStages";
const ID_DESCRIPTION: &str = "The ID of the construction stage";

impl Operation {
    /// Every operation, in route table order.
    pub const ALL: [Self; 5] = [
        Self::ListStages,
        Self::GetStage,
        Self::CreateStage,
        Self::UpdateStage,
        Self::DeleteStage,
    ];

    /// Stable identifier used in logs and the API document.
    pub const fn operation_id(self) -> &'static str {
        match self {
            Self::ListStages => "listStages",
            Self::GetStage => "getStage",
            Self::CreateStage => "createStage",
            Self::UpdateStage => "updateStage",
            Self::DeleteStage => "deleteStage",
        }
    }

    /// The verb this operation is routed on.
    pub fn method(self) -> Method {
        match self {
            Self::ListStages | Self::GetStage => Method::GET,
            Self::CreateStage => Method::POST,
            Self::UpdateStage => Method::PATCH,
            Self::DeleteStage => Method::DELETE,
        }
    }

    /// The router pattern this operation is routed on.
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::ListStages | Self::CreateStage => COLLECTION,
            Self::GetStage | Self::UpdateStage | Self::DeleteStage => ITEM,
        }
    }

    /// Whether the operation reads a JSON request body.
    pub const fn has_body(self) -> bool {
        matches!(self, Self::CreateStage | Self::UpdateStage)
    }

    /// One-line summary for documentation.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::ListStages => "Get all construction stages",
            Self::GetStage => "Get a specific construction stage",
            Self::CreateStage => "Create a new construction stage",
            Self::UpdateStage => "Update a construction stage",
            Self::DeleteStage => "Delete a construction stage",
        }
    }

    /// Documentation for this operation.
    pub fn doc(self) -> EndpointDoc {
        let body = match self {
            Self::ListStages => ResponseBody::List(schemas::STAGE),
            Self::DeleteStage => ResponseBody::One(schemas::SUCCESS),
            _ => ResponseBody::One(schemas::STAGE),
        };
        let doc = EndpointDoc::new(
            self.method(),
            self.pattern(),
            self.operation_id(),
            self.summary(),
            body,
        )
        .tag(TAG);

        let doc = match self {
            Self::ListStages => doc,
            Self::GetStage => doc
                .param("id", ID_DESCRIPTION)
                .error(StatusCode::NOT_FOUND, "Construction stage not found"),
            Self::CreateStage => doc
                .request(schemas::STAGE_CREATE)
                .success(StatusCode::CREATED, "Construction stage created")
                .error(StatusCode::BAD_REQUEST, "Empty or malformed JSON body")
                .error(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed"),
            Self::UpdateStage => doc
                .param("id", ID_DESCRIPTION)
                .request(schemas::STAGE_UPDATE)
                .error(StatusCode::BAD_REQUEST, "Empty or malformed JSON body")
                .error(StatusCode::NOT_FOUND, "Construction stage not found")
                .error(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed"),
            Self::DeleteStage => doc
                .param("id", ID_DESCRIPTION)
                .success(StatusCode::OK, "Construction stage deleted")
                .error(StatusCode::NOT_FOUND, "Construction stage not found"),
        };

        doc.error(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
    }
}

/// Builds the route table. Declaration order is match order.
pub fn stage_routes() -> Result<Router<Operation>, RouterError> {
    let mut router = Router::new();
    for op in Operation::ALL {
        router.insert(op.method(), op.pattern(), op)?;
    }
    Ok(router)
}

/// Generates the OpenAPI document for the route table.
pub fn openapi(version: &str) -> stages_docs::DocsResult<OpenApi> {
    let endpoints: Vec<EndpointDoc> = Operation::ALL.iter().map(|op| op.doc()).collect();
    OpenApiGenerator::new().version(version).generate(&endpoints)
}
