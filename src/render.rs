use chrono::{DateTime, Utc};
use textwrap::{wrap, Options as WrapOptions};

use crate::api::{PostDetail, ProfilePage};
use crate::comments::{CollapseState, CommentTree};
use crate::markdown;
use crate::models::{Community, Post, SearchResult};

const GUTTER: &str = "| ";

pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s if s < 30 * 86_400 => format!("{}d", s / 86_400),
        s if s < 365 * 86_400 => format!("{}mo", s / (30 * 86_400)),
        s => format!("{}y", s / (365 * 86_400)),
    }
}

pub fn post_row(post: &Post, now: DateTime<Utc>, width: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{} · u/{} · {}",
        post.community.title(),
        post.author.name,
        relative_age(post.created_at, now)
    )];
    lines.extend(wrap_text(&post.title, width, "", ""));
    lines.push(format!(
        "{} points · {} comments",
        post.score(),
        post.comment_count
    ));
    lines
}

pub fn post_list(posts: &[Post], now: DateTime<Utc>, width: usize) -> Vec<String> {
    if posts.is_empty() {
        return vec!["No posts yet".to_string()];
    }
    let mut lines = Vec::new();
    for (idx, post) in posts.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        lines.extend(post_row(post, now, width));
        lines.push(format!("  id: {}", post.id));
    }
    lines
}

pub fn community_list(communities: &[Community]) -> Vec<String> {
    communities
        .iter()
        .map(|community| match community.subscriber_count {
            Some(count) => format!("m/{} ({}) · {count} members", community.name, community.title()),
            None => format!("m/{} ({})", community.name, community.title()),
        })
        .collect()
}

pub fn post_detail(
    detail: &PostDetail,
    collapse: &CollapseState,
    now: DateTime<Utc>,
    width: usize,
) -> Vec<String> {
    let post = &detail.post;
    let mut lines = post_row(post, now, width);
    if let Some(body) = post.body.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.push(String::new());
        lines.extend(markdown_block(body, width, ""));
    }
    if let Some(url) = post.url.as_deref() {
        lines.push(format!("link: {url}"));
    }

    lines.push(String::new());
    if detail.comments.is_empty() {
        lines.push("No comments yet".to_string());
    } else {
        lines.push(format!("{} comments", detail.comments.total()));
        lines.extend(comment_rows(&detail.comments, collapse, now, width));
    }
    lines
}

pub fn comment_rows(
    tree: &CommentTree,
    collapse: &CollapseState,
    now: DateTime<Utc>,
    width: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    for row in collapse.visible(tree) {
        let gutter = GUTTER.repeat(row.depth);
        let mut header = format!(
            "{gutter}u/{} • {}",
            row.node.author.name,
            relative_age(row.node.created_at, now)
        );
        if row.collapsed {
            header.push_str(" [+]");
            if row.hidden_replies > 0 {
                header.push_str(&format!(" {} hidden", row.hidden_replies));
            }
            lines.push(header);
            continue;
        }
        lines.push(header);
        lines.extend(markdown_block(&row.node.body, width, &gutter));
        lines.push(format!("{gutter}{} points", row.node.score()));
    }
    lines
}

pub fn search_rows(results: &[SearchResult], now: DateTime<Utc>, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, result) in results.iter().enumerate() {
        if idx > 0 {
            lines.push(String::new());
        }
        let mut header = result.kind.to_uppercase();
        if let Some(author) = &result.author {
            header.push_str(&format!(" · {}", author.name));
        }
        header.push_str(&format!(" · {}", relative_age(result.created_at, now)));
        lines.push(header);

        if let Some(title) = result.title.as_deref().filter(|t| !t.is_empty()) {
            lines.extend(wrap_text(title, width, "", ""));
        }
        if let Some(content) = result.content.as_deref().filter(|c| !c.is_empty()) {
            lines.extend(markdown_block(content, width, "  ").into_iter().take(2));
        }
        if let Some(post) = &result.post {
            lines.push(format!("  re: {}", post.title));
        }
    }
    lines
}

pub fn profile(page: &ProfilePage, now: DateTime<Utc>, width: usize) -> Vec<String> {
    let agent = &page.agent;
    let mut lines = vec![format!("u/{}", agent.name)];
    if let Some(bio) = agent.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.extend(markdown_block(bio, width, ""));
    }
    lines.push(format!(
        "{} karma · {} followers · {} following",
        agent.karma, agent.follower_count, agent.following_count
    ));
    let mut joined = format!("joined {} ago", relative_age(agent.created_at, now));
    if let Some(active) = agent.last_active {
        joined.push_str(&format!(" · active {}", relative_age(active, now)));
    }
    lines.push(joined);

    lines.push(String::new());
    lines.push("Recent posts".to_string());
    lines.extend(post_list(&page.recent_posts, now, width));
    lines
}

fn markdown_block(text: &str, width: usize, prefix: &str) -> Vec<String> {
    markdown::flatten(text)
        .iter()
        .flat_map(|line| {
            if line.is_empty() {
                vec![prefix.trim_end().to_string()]
            } else {
                wrap_text(line, width, prefix, prefix)
            }
        })
        .collect()
}

fn wrap_text(text: &str, width: usize, first_prefix: &str, rest_prefix: &str) -> Vec<String> {
    if width == 0 {
        return vec![format!("{first_prefix}{text}")];
    }
    let min_width = first_prefix
        .chars()
        .count()
        .max(rest_prefix.chars().count())
        .saturating_add(1);
    let options = WrapOptions::new(width.max(min_width))
        .break_words(false)
        .initial_indent(first_prefix)
        .subsequent_indent(rest_prefix);
    wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post_json;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn ages_use_the_largest_whole_unit() {
        let now = now();
        assert_eq!(relative_age(now - Duration::seconds(59), now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(5), now), "5m");
        assert_eq!(relative_age(now - Duration::hours(3), now), "3h");
        assert_eq!(relative_age(now - Duration::days(2), now), "2d");
        assert_eq!(relative_age(now - Duration::days(125), now), "4mo");
        assert_eq!(relative_age(now - Duration::days(400), now), "1y");
        assert_eq!(relative_age(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn post_row_shows_score_and_comment_count() {
        let post: Post = serde_json::from_value(post_json("p1", 12, 15, 4)).unwrap();
        let lines = post_row(&post, now(), 80);
        assert_eq!(lines[0], "general · u/clawd · just now");
        assert_eq!(lines[1], "title of p1");
        assert_eq!(lines[2], "-3 points · 4 comments");
    }

    fn tree() -> CommentTree {
        serde_json::from_value::<Vec<crate::models::CommentNode>>(json!([{
            "id": "c1",
            "content": "top **level**",
            "author": {"id": "a1", "name": "clawd"},
            "upvotes": 2,
            "downvotes": 0,
            "created_at": "2025-01-30T11:00:00Z",
            "replies": [{
                "id": "c2",
                "content": "a reply",
                "author": {"id": "a2", "name": "molty"},
                "upvotes": 0,
                "downvotes": 1,
                "created_at": "2025-01-30T11:55:00Z"
            }]
        }]))
        .map(CommentTree::new)
        .unwrap()
    }

    #[test]
    fn comments_indent_by_depth() {
        let lines = comment_rows(&tree(), &CollapseState::new(), now(), 80);
        assert_eq!(
            lines,
            vec![
                "u/clawd • 1h",
                "top level",
                "2 points",
                "| u/molty • 5m",
                "| a reply",
                "| -1 points",
            ]
        );
    }

    #[test]
    fn collapsed_comment_hides_body_and_replies() {
        let mut collapse = CollapseState::new();
        collapse.toggle("c1");
        let lines = comment_rows(&tree(), &collapse, now(), 80);
        assert_eq!(lines, vec!["u/clawd • 1h [+] 1 hidden"]);
    }

    #[test]
    fn long_titles_wrap_at_width() {
        let lines = wrap_text("one two three four", 9, "", "");
        assert_eq!(lines, vec!["one two", "three", "four"]);
        let lines = wrap_text("one two three", 9, "| ", "| ");
        assert_eq!(lines, vec!["| one two", "| three"]);
    }
}
