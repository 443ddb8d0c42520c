//! One-shot development seed: wipes the database and repopulates it with
//! a handful of sample users, warbles, follow edges, and like edges.

use anyhow::Result;
use sea_orm::EntityTrait;
use tracing::info;

use crate::db::{NewUser, Store};
use crate::entities::prelude::*;

pub async fn run(store: &Store) -> Result<()> {
    info!("Seeding database with sample data");

    Likes::delete_many().exec(&store.conn).await?;
    Follows::delete_many().exec(&store.conn).await?;
    Messages::delete_many().exec(&store.conn).await?;
    Users::delete_many().exec(&store.conn).await?;

    let sample_users = [
        ("tuckerdiane", "tuckerdiane@example.com", "Wildlife photographer. Will warble for coffee."),
        ("wendyderek", "wendyderek@example.com", "Backyard birder and amateur astronomer."),
        ("guyrachel", "guyrachel@example.com", "Always somewhere between two airports."),
        ("leejason", "leejason@example.com", "I mostly post about sandwiches."),
    ];

    let mut users = Vec::new();
    for (username, email, bio) in sample_users {
        let user = store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password: "password".to_string(),
                image_url: None,
                header_image_url: None,
            })
            .await?;
        store
            .update_user_profile(
                user.id,
                crate::db::ProfileUpdate {
                    username: user.username.clone(),
                    email: user.email.clone(),
                    image_url: user.image_url.clone(),
                    header_image_url: user.header_image_url.clone(),
                    bio: Some(bio.to_string()),
                    location: None,
                },
            )
            .await?;
        users.push(user);
    }

    let sample_warbles = [
        (0, "Spotted a kingfisher by the river this morning."),
        (0, "Day three of the heron standoff. The heron is winning."),
        (1, "Saturn's rings through the new scope tonight, weather permitting."),
        (1, "A nuthatch walked straight down the feeder pole. Show-off."),
        (2, "Gate changed four times. I live here now."),
        (3, "Hot take: a hot dog is a sandwich and I will not elaborate."),
    ];

    let mut warbles = Vec::new();
    for (author, text) in sample_warbles {
        warbles.push(store.create_message(users[author].id, text).await?);
    }

    // Everyone follows tuckerdiane; tuckerdiane follows wendyderek.
    for user in &users[1..] {
        store.follow(user.id, users[0].id).await?;
    }
    store.follow(users[0].id, users[1].id).await?;

    store.like_message(users[1].id, warbles[0].id).await?;
    store.like_message(users[2].id, warbles[0].id).await?;
    store.like_message(users[0].id, warbles[2].id).await?;
    store.like_message(users[3].id, warbles[4].id).await?;

    info!(
        "Seeded {} users and {} warbles (all passwords: \"password\")",
        users.len(),
        warbles.len()
    );

    Ok(())
}
