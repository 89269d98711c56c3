use clap::Subcommand;
use tendly_core::PostKind;

use super::{finish, open_engine, print_json, CliResult};

#[derive(Subcommand)]
pub enum SocialAction {
    /// Show the feed, newest first
    Feed,
    /// Publish a post
    Post {
        content: String,
        /// achievement, garden_showcase or milestone
        #[arg(long, default_value = "garden_showcase")]
        kind: PostKind,
    },
    /// Share an unlocked achievement
    Share {
        achievement_id: String,
    },
    /// Like or unlike a post
    Like {
        post_id: String,
    },
    /// Comment on a post
    Comment {
        post_id: String,
        content: String,
    },
    /// Delete one of your posts
    Delete {
        post_id: String,
    },
    /// Show this week's challenges
    Challenges,
}

pub fn run(action: SocialAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        SocialAction::Challenges => {
            print_json(&engine.weekly_challenges())?;
        }
        SocialAction::Feed => {
            let me = engine.identity().user_id.clone();
            let posts: Vec<_> = engine
                .feed()
                .posts
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "post": p,
                        "likes": p.likes(),
                        "comments": p.comment_count(),
                        "liked_by_me": p.is_liked_by(&me),
                    })
                })
                .collect();
            print_json(&posts)?;
        }
        SocialAction::Post { content, kind } => {
            let post = engine.create_post(kind, &content)?;
            print_json(&post)?;
        }
        SocialAction::Share { achievement_id } => {
            let post = engine.share_achievement(&achievement_id)?;
            print_json(&post)?;
        }
        SocialAction::Like { post_id } => {
            let liked = engine.toggle_like(&post_id)?;
            let likes = engine.feed().get(&post_id).map(|p| p.likes()).unwrap_or(0);
            print_json(&serde_json::json!({ "liked": liked, "likes": likes }))?;
        }
        SocialAction::Comment { post_id, content } => {
            let comment = engine.add_comment(&post_id, &content)?;
            print_json(&comment)?;
        }
        SocialAction::Delete { post_id } => {
            engine.delete_post(&post_id)?;
            eprintln!("Post deleted: {post_id}");
        }
    }

    finish(&mut engine);
    Ok(())
}
