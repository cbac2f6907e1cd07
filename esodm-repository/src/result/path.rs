//! Paths into an aggregation result tree.

use std::fmt;
use std::str::FromStr;

use crate::result::aggregation::AggregationError;

/// Which bucket of a bucketing aggregation to descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketSelector {
    /// Position in response order.
    Index(usize),
    /// Bucket key.
    Key(String),
}

/// One step of an [`AggregationPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub bucket: Option<BucketSelector>,
}

/// Path through nested aggregations.
///
/// The textual form alternates aggregation names and bucket indices,
/// separated by dots: `"test_agg.0.test_agg_2"`. A bucket can also be
/// selected by key with `name[key]`: `"test_agg[weak].test_agg_2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPath {
    steps: Vec<PathStep>,
}

impl AggregationPath {
    /// Path naming a single top-level aggregation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep {
                name: name.into(),
                bucket: None,
            }],
        }
    }

    /// Select a bucket of the last aggregation by position.
    pub fn bucket(mut self, index: usize) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.bucket = Some(BucketSelector::Index(index));
        }
        self
    }

    /// Select a bucket of the last aggregation by key.
    pub fn bucket_key(mut self, key: impl Into<String>) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.bucket = Some(BucketSelector::Key(key.into()));
        }
        self
    }

    /// Descend into a sub-aggregation.
    pub fn then(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep {
            name: name.into(),
            bucket: None,
        });
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

impl FromStr for AggregationPath {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AggregationError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let mut steps: Vec<PathStep> = Vec::new();
        for segment in split_segments(s).ok_or_else(|| invalid("unterminated bucket key"))? {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }

            if let Ok(index) = segment.parse::<usize>() {
                let step = steps
                    .last_mut()
                    .ok_or_else(|| invalid("path starts with a bucket index"))?;
                if step.bucket.is_some() {
                    return Err(invalid("two bucket selectors in a row"));
                }
                step.bucket = Some(BucketSelector::Index(index));
                continue;
            }

            if let Some(previous) = steps.last() {
                if previous.bucket.is_none() {
                    return Err(invalid("sub-aggregation without a bucket selector"));
                }
            }

            let step = match segment.split_once('[') {
                Some((name, rest)) => {
                    let key = rest
                        .strip_suffix(']')
                        .filter(|key| !key.contains(']'))
                        .ok_or_else(|| invalid("text after bucket key"))?;
                    if name.is_empty() || key.is_empty() {
                        return Err(invalid("empty name or bucket key"));
                    }
                    PathStep {
                        name: name.to_string(),
                        bucket: Some(BucketSelector::Key(key.to_string())),
                    }
                }
                None => PathStep {
                    name: segment.to_string(),
                    bucket: None,
                },
            };
            steps.push(step);
        }

        Ok(Self { steps })
    }
}

/// Split on dots outside `[...]`. `None` when a bracket is left open.
fn split_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_key = false;

    for (i, c) in path.char_indices() {
        match c {
            '[' if !in_key => in_key = true,
            ']' if in_key => in_key = false,
            '.' if !in_key => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_key {
        return None;
    }
    segments.push(&path[start..]);
    Some(segments)
}

impl fmt::Display for AggregationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&step.name)?;
            match &step.bucket {
                Some(BucketSelector::Index(index)) => write!(f, ".{}", index)?,
                Some(BucketSelector::Key(key)) => write!(f, "[{}]", key)?,
                None => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_path() {
        let path: AggregationPath = "test_agg.0.test_agg_2".parse().unwrap();
        assert_eq!(path, AggregationPath::new("test_agg").bucket(0).then("test_agg_2"));
        assert_eq!(path.to_string(), "test_agg.0.test_agg_2");
    }

    #[test]
    fn test_parse_keyed_path() {
        let path: AggregationPath = "colors[red].sizes.1".parse().unwrap();
        assert_eq!(
            path,
            AggregationPath::new("colors")
                .bucket_key("red")
                .then("sizes")
                .bucket(1)
        );
        assert_eq!(path.to_string(), "colors[red].sizes.1");
    }

    #[test]
    fn test_parse_bucket_keys_with_dots() {
        let path: AggregationPath = "test_agg.0.test_agg_2[*-20.0]".parse().unwrap();
        assert_eq!(
            path,
            AggregationPath::new("test_agg")
                .bucket(0)
                .then("test_agg_2")
                .bucket_key("*-20.0")
        );

        let path: AggregationPath = "terms[foo.bar].nested[20.0-*]".parse().unwrap();
        assert_eq!(
            path.steps()[0].bucket,
            Some(BucketSelector::Key("foo.bar".to_string()))
        );
        assert_eq!(
            path.steps()[1].bucket,
            Some(BucketSelector::Key("20.0-*".to_string()))
        );
    }

    #[test]
    fn test_display_parses_back() {
        let paths = [
            AggregationPath::new("test_agg")
                .bucket(0)
                .then("test_agg_2")
                .bucket_key("*-20.0"),
            AggregationPath::new("test_agg").bucket_key("20.0-*").then("test_agg_2"),
            AggregationPath::new("colors").bucket(2).then("sizes").bucket(1),
        ];

        for path in paths {
            let text = path.to_string();
            assert_eq!(text.parse::<AggregationPath>().unwrap(), path, "{}", text);
        }
    }

    #[test]
    fn test_reject_invalid_paths() {
        for path in [
            "", "0", "a..b", "a.b", "a.0.1", "a[x", "a[]", "[x]", "a[x]y", "a[x].0", "a[1.2",
        ] {
            assert!(
                matches!(
                    path.parse::<AggregationPath>(),
                    Err(AggregationError::InvalidPath { .. })
                ),
                "{} should be rejected",
                path
            );
        }
    }
}
