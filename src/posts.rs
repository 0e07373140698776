//! Generated demo content for the posts pages.

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use rand::Rng;
use serde::Serialize;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

const IMAGE_IDS: [&str; 5] = [
    "7d4e9175-95ea-4c5f-8be5-92a6b708bb3c",
    "2d2ab7df-cdbc-48a8-a936-35bba702def5",
    "6e12f3de-d5fd-4ebb-855b-8cbc485278b7",
    "afc2cfe7-5cac-4b80-9b9a-d5c65ef0c728",
    "cab5b7f2-774e-4884-a200-0c0180fa777f",
];

/// Sentences in a post body.
const BODY_SENTENCES: usize = 100;
/// Oldest allowed post age.
const MAX_AGE_DAYS: i64 = 2 * 365;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub text: String,
    pub author: String,
    #[serde(skip)]
    pub published: OffsetDateTime,
    /// `published` formatted for display.
    pub date: String,
    pub image_id: String,
    pub comments: Vec<Comment>,
}

/// Generate `count` posts, newest first.
///
/// Each post gets one to three comments, each comment one to three
/// replies; replies have no replies of their own.
pub fn generate_posts<R: Rng>(rng: &mut R, count: usize) -> Vec<Post> {
    let now = OffsetDateTime::now_utc();
    let mut posts: Vec<Post> = (0..count)
        .map(|i| generate_post(rng, i, now))
        .collect();
    posts.sort_by(|a, b| b.published.cmp(&a.published));
    posts
}

fn generate_post<R: Rng>(rng: &mut R, index: usize, now: OffsetDateTime) -> Post {
    let age = Duration::seconds(rng.random_range(0..MAX_AGE_DAYS * 24 * 60 * 60));
    let published = now - age;
    Post {
        title: Sentence(4..10).fake_with_rng(rng),
        text: Paragraph(BODY_SENTENCES..BODY_SENTENCES + 1).fake_with_rng(rng),
        author: Name().fake_with_rng(rng),
        published,
        date: format_date(published),
        image_id: format!("{}.jpg", IMAGE_IDS[index % IMAGE_IDS.len()]),
        comments: generate_comments(rng, true),
    }
}

fn generate_comments<R: Rng>(rng: &mut R, with_replies: bool) -> Vec<Comment> {
    (0..rng.random_range(1..=3))
        .map(|_| Comment {
            author: Name().fake_with_rng(rng),
            text: Paragraph(2..5).fake_with_rng(rng),
            replies: if with_replies {
                generate_comments(rng, false)
            } else {
                Vec::new()
            },
        })
        .collect()
}

fn format_date(at: OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] [hour]:[minute]");
    at.format(&format).unwrap_or_else(|_| at.to_string())
}
