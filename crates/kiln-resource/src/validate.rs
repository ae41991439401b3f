//! The parameter validator and identifier collection.

use kiln_core::{
    ApiRequest, ErrorResponse, ErrorSource, ParamDecl, ParamError, ParamKind, ParamMap,
    VALIDATE_CONTEXT,
};

/// Query parameter carrying a list of identifiers.
pub const IDS_PARAM: &str = "ids[]";

/// Path parameter carrying a single identifier.
pub const ID_PARAM: &str = "id";

/// Message of the error returned when no identifier was supplied.
pub const NO_IDS_MESSAGE: &str = "No item-id(s) specified";

/// Applies the form-encoding rule to a raw parameter value.
///
/// # Example
///
/// ```
/// assert_eq!(kiln_resource::decode_param("Ada+Lovelace"), "Ada Lovelace");
/// ```
#[must_use]
pub fn decode_param(raw: &str) -> String {
    raw.replace('+', " ")
}

/// Validates a request against declared parameters.
///
/// Query parameters accumulate every value in encounter order. A path
/// parameter contributes at most one. Parameters that were not sent get no
/// entry. The first required parameter that is missing fails the whole call.
pub fn validate_params(request: &ApiRequest, declared: &[ParamDecl]) -> Result<ParamMap, ParamError> {
    let mut params = ParamMap::new();
    for decl in declared {
        let values: Vec<String> = match decl.kind() {
            ParamKind::Query => request.query_values(decl.name()).map(decode_param).collect(),
            ParamKind::Path => request.path_param(decl.name()).map(decode_param).into_iter().collect(),
        };
        if values.is_empty() {
            if decl.is_required() {
                return Err(ParamError {
                    kind: decl.kind().label(),
                    name: decl.name().to_string(),
                });
            }
            continue;
        }
        for value in values {
            params.push(decl.name(), value);
        }
    }
    Ok(params)
}

/// Collects the identifiers of a by-ids request.
///
/// Non-empty `ids[]` values come first, then the `{id}` path segment.
/// Duplicates keep their first position.
pub fn collect_ids(request: &ApiRequest) -> Result<Vec<String>, ErrorResponse> {
    let from_query = request
        .query_values(IDS_PARAM)
        .filter(|raw| !raw.is_empty())
        .map(decode_param);
    let from_path = request.path_param(ID_PARAM).map(decode_param);

    let mut ids: Vec<String> = Vec::new();
    for id in from_query.chain(from_path) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(ErrorResponse::bad_request(NO_IDS_MESSAGE, VALIDATE_CONTEXT)
            .with_source(ErrorSource::parameter(IDS_PARAM)));
    }
    Ok(ids)
}
