use ferrotex_syntax::ast::ParameterContent;
use indexmap::IndexMap;

use crate::usage::Parameter;

/// Reads `key=value` pairs from a command's optional parameters.
///
/// `\cmd[a][b=c]` reads like `[a,b=c]`. Pieces are split on every comma, with
/// no regard for braces, and then once on the first `=`. A piece without `=`
/// becomes a key with an empty value. A repeated key keeps its first position
/// and takes the last value.
pub fn optional_parameter_map<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
) -> IndexMap<String, String> {
    let joined = parameters
        .into_iter()
        .filter(|param| !param.is_required())
        .map(|param| {
            param
                .contents
                .iter()
                .map(|content| match content {
                    ParameterContent::Text(text) | ParameterContent::Group(text) => text.as_str(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(",");

    let mut map = IndexMap::new();
    if joined.trim().is_empty() {
        return map;
    }
    for piece in joined.split(',') {
        let (key, value) = piece.split_once('=').unwrap_or((piece, ""));
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    map
}
