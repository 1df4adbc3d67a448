use crate::storage::prepare::PrepareError;

/// A bind marker found in query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedMarker {
    /// `:name`
    Named(String),
    /// `?`, numbered from zero in order of appearance.
    Positional(usize),
}

/// Query text accepted by the preparer, with its bind markers in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTemplate {
    /// Hex fingerprint of the query text.
    pub id: String,
    pub query: String,
    pub bind_markers: Vec<ScannedMarker>,
}

impl PreparedTemplate {
    pub fn named_markers(&self) -> Vec<&str> {
        self.bind_markers
            .iter()
            .filter_map(|m| match m {
                ScannedMarker::Named(name) => Some(name.as_str()),
                ScannedMarker::Positional(_) => None,
            })
            .collect()
    }

    pub fn positional_count(&self) -> usize {
        self.bind_markers
            .iter()
            .filter(|m| matches!(m, ScannedMarker::Positional(_)))
            .count()
    }

    pub fn marker_count(&self, name: &str) -> usize {
        self.named_markers().iter().filter(|m| **m == name).count()
    }
}

/// Collects bind markers outside of single-quoted literals.
pub fn scan_bind_markers(query: &str) -> Result<Vec<ScannedMarker>, PrepareError> {
    let bytes = query.as_bytes();
    let mut markers = Vec::new();
    let mut positional = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => return Err(PrepareError::UnterminatedLiteral { offset: start }),
                        // '' is an escaped quote inside a literal
                        Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                        Some(b'\'') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            b'?' => {
                markers.push(ScannedMarker::Positional(positional));
                positional += 1;
                i += 1;
            }
            b':' if bytes
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == b'_') =>
            {
                let start = i + 1;
                let mut end = start;
                while bytes
                    .get(end)
                    .is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_')
                {
                    end += 1;
                }
                markers.push(ScannedMarker::Named(query[start..end].to_string()));
                i = end;
            }
            _ => i += 1,
        }
    }

    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_named_and_positional_markers() {
        let markers =
            scan_bind_markers("UPDATE t SET v = v + ? WHERE a = :a AND b = ?").unwrap();
        assert_eq!(
            markers,
            vec![
                ScannedMarker::Positional(0),
                ScannedMarker::Named("a".into()),
                ScannedMarker::Positional(1),
            ]
        );
    }

    #[test]
    fn ignores_markers_inside_literals() {
        let markers = scan_bind_markers("SELECT * FROM t WHERE a = 'it''s :x ?' AND b = :b").unwrap();
        assert_eq!(markers, vec![ScannedMarker::Named("b".into())]);
    }

    #[test]
    fn rejects_unterminated_literal() {
        let err = scan_bind_markers("SELECT * FROM t WHERE a = 'oops").unwrap_err();
        assert!(matches!(err, PrepareError::UnterminatedLiteral { offset: 26 }));
    }
}
