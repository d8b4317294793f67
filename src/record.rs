// Raw export records: `likeCount \t postBody [\t commentLikeCount \t commentBody]*`

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// The post that opens a thread. Its body becomes the dialogue context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub like_count: String, // kept verbatim, unused downstream
    pub body: String,
}

/// One reply to a post. Its body becomes an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub like_count: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub post: RawPost,
    pub comments: Vec<RawComment>,
}

/// A (context, utterance) pair, one per comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairRow {
    #[serde(rename = "Context")]
    pub context: String,
    #[serde(rename = "Utterance")]
    pub utterance: String,
}

impl PairRow {
    pub fn new(context: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            utterance: utterance.into(),
        }
    }
}

/// Parse one decoded raw line. `line_no` is 1-based and only used for errors.
///
/// A valid line has a like-count, a post body and then like-count/body pairs,
/// so its field count is even and at least 2. Bodies lose trailing
/// whitespace (including the line terminator); like-counts are kept as is.
pub fn parse_line(line: &str, line_no: usize) -> Result<PostRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    let malformed = |reason: &'static str| DatasetError::MalformedRecord {
        line: line_no,
        fields: fields.len(),
        reason,
    };

    if fields.len() < 2 {
        return Err(malformed("missing post body"));
    }
    if fields.len() % 2 != 0 {
        return Err(malformed("comment like-count without a body"));
    }

    let post = RawPost {
        like_count: fields[0].to_owned(),
        body: fields[1].trim_end().to_owned(),
    };
    let comments = fields[2..]
        .chunks_exact(2)
        .map(|pair| RawComment {
            like_count: pair[0].to_owned(),
            body: pair[1].trim_end().to_owned(),
        })
        .collect();

    Ok(PostRecord { post, comments })
}

impl PostRecord {
    /// One row per comment, all sharing the post body as context.
    /// A post without comments yields nothing.
    pub fn flatten(&self) -> impl Iterator<Item = PairRow> + '_ {
        self.comments
            .iter()
            .map(|comment| PairRow::new(self.post.body.as_str(), comment.body.as_str()))
    }
}
