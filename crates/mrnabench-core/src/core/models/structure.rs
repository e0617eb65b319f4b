use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Invalid dot-bracket symbol '{symbol}' at position {position}")]
    InvalidSymbol { position: usize, symbol: char },
    #[error("Closing bracket at position {position} has no matching opening bracket")]
    UnmatchedClose { position: usize },
    #[error("{count} opening bracket(s) are never closed")]
    UnclosedOpen { count: usize },
}

/// Checks that `structure` only uses `.`, `(` and `)` and that brackets nest properly.
pub fn validate(structure: &str) -> Result<(), StructureError> {
    base_pairs(structure).map(|_| ())
}

/// Returns the `(open, close)` index pairs of a dot-bracket string, ordered by closing position.
pub fn base_pairs(structure: &str) -> Result<Vec<(usize, usize)>, StructureError> {
    let mut stack = Vec::new();
    let mut pairs = Vec::new();
    for (position, symbol) in structure.chars().enumerate() {
        match symbol {
            '.' => {}
            '(' => stack.push(position),
            ')' => {
                let open = stack
                    .pop()
                    .ok_or(StructureError::UnmatchedClose { position })?;
                pairs.push((open, position));
            }
            _ => return Err(StructureError::InvalidSymbol { position, symbol }),
        }
    }
    if !stack.is_empty() {
        return Err(StructureError::UnclosedOpen { count: stack.len() });
    }
    Ok(pairs)
}
