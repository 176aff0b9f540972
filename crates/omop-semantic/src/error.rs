#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("invalid field config paths:\n{}", bullet_list(.errors))]
    InvalidFieldPaths { errors: Vec<String> },
}

fn bullet_list(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("- {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, SemanticError>;
