use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ggame::api::ApiClient;
use ggame::comments::{build_comment_tree, render, render_thread, RenderContext, ThreadUi};
use ggame::config::{
    Cli, Command, CommentCommand, Config, GuestbookCommand, NotificationCommand, PostCommand,
    ProfileCommand,
};
use ggame::datefmt::DateFormatter;
use ggame::feed::FeedPager;
use ggame::models::{Category, Notification, Post};
use ggame::pages::all_posts::AllPostsPage;
use ggame::pages::auth::{LoginForm, SignupForm};
use ggame::pages::home::{publish_comment, publish_post, revise_comment, revise_post, HomePage};
use ggame::pages::profile::ProfilePage;
use ggame::pages::{require_session, Route};
use ggame::session::SessionContext;
use ggame::widgets::notifications::{self, NotificationBell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    let session = SessionContext::open(&Config::session_path(&data_dir))?;
    let api = ApiClient::new(&config.api.base_url, session)?;

    let app = App {
        dates: DateFormatter::with_offset_hours(config.display.utc_offset_hours),
        api,
        config,
    };
    app.run(cli.command).await
}

struct App {
    api: ApiClient,
    config: Config,
    dates: DateFormatter,
}

fn redirected(route: Route) -> anyhow::Error {
    match route {
        Route::Login => anyhow!("Not logged in. Run `ggame login` first."),
        other => anyhow!("Redirected to {}", other),
    }
}

/// Turn a page action's outcome into a CLI result.
fn checked(ok: bool, error: &Option<String>) -> anyhow::Result<()> {
    if ok {
        Ok(())
    } else {
        Err(anyhow!(error.clone().unwrap_or_else(|| "Request failed.".into())))
    }
}

impl App {
    async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Signup {
                username,
                email,
                password,
                display_name,
                bio,
            } => {
                let mut form = SignupForm {
                    username,
                    email,
                    password,
                    display_name,
                    bio: bio.unwrap_or_default(),
                    error: None,
                };
                form.submit(&self.api).await.ok_or_else(|| {
                    anyhow!(form.error.clone().unwrap_or_else(|| "Signup failed.".into()))
                })?;
                self.whoami()
            }
            Command::Login { email, password } => {
                let mut form = LoginForm::new(email, password);
                form.submit(&self.api).await.ok_or_else(|| {
                    anyhow!(form.error.clone().unwrap_or_else(|| "Login failed.".into()))
                })?;
                self.whoami()
            }
            Command::Logout => {
                self.api.logout()?;
                println!("Logged out.");
                Ok(())
            }
            Command::Whoami => self.whoami(),
            Command::Feed { category, pages } => self.feed(category, pages).await,
            Command::Posts { page, category } => self.posts(page, category).await,
            Command::Post(cmd) => self.post(cmd).await,
            Command::Comment(cmd) => self.comment(cmd).await,
            Command::Thread { post_id, html } => self.thread(&post_id, html).await,
            Command::Upload { path } => {
                require_session(self.api.session()).map_err(redirected)?;
                let uploaded = self.api.upload_image(&path).await?;
                println!("{}", uploaded.url);
                Ok(())
            }
            Command::Profile(cmd) => self.profile(cmd).await,
            Command::Guestbook(cmd) => self.guestbook(cmd).await,
            Command::Notifications(cmd) => self.notifications(cmd).await,
            Command::Users { limit } => {
                require_session(self.api.session()).map_err(redirected)?;
                for user in self.api.list_users(limit).await? {
                    println!("{}  @{}  {}", user.id, user.username, user.display_name);
                }
                Ok(())
            }
        }
    }

    fn whoami(&self) -> anyhow::Result<()> {
        let session = require_session(self.api.session()).map_err(redirected)?;
        let user = session.user;
        println!("{} (@{}) [{}]", user.display_name, user.username, user.id);
        Ok(())
    }

    fn print_post(&self, post: &Post) {
        let edited = if post.updated_at.is_some() { " (edited)" } else { "" };
        println!(
            "[{}] {} · {} · {}{}",
            post.id,
            post.author_name(),
            post.category,
            self.dates.time_ago(&post.created_at),
            edited
        );
        if !post.content.is_empty() {
            println!("  {}", post.content);
        }
        if let Some(url) = &post.image_url {
            println!("  [image] {}", url);
        }
        println!("  ♥ {}", post.likes_count);
    }

    async fn feed(&self, category: Category, pages: u32) -> anyhow::Result<()> {
        let mut pager = FeedPager::from_config(&self.config.feed);
        pager.reset(category);
        let mut home = HomePage::load(self.api.clone(), pager, self.dates, None)
            .await
            .map_err(redirected)?;

        for _ in 1..pages {
            if home.pager.is_exhausted() || !home.load_more().await {
                break;
            }
        }

        for post in &home.posts {
            self.print_post(post);
            let thread = home.thread(&post.id);
            for line in render::to_text(&thread).lines() {
                println!("    {}", line);
            }
            println!();
        }
        tracing::info!(
            "{} posts, {} members, feed {:?}",
            home.posts.len(),
            home.members.len(),
            home.pager.state()
        );
        Ok(())
    }

    async fn posts(&self, page: u32, category: Category) -> anyhow::Result<()> {
        let listing = AllPostsPage::load(self.api.clone(), category, page)
            .await
            .map_err(redirected)?;
        checked(listing.error.is_none(), &listing.error)?;

        for post in &listing.posts {
            self.print_post(post);
        }
        let nav = listing.pagination();
        let buttons: Vec<String> = nav
            .pages
            .iter()
            .map(|&p| {
                if p == listing.current_page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!(
            "{}{}{}",
            nav.prev.map(|_| "◀ ").unwrap_or_default(),
            buttons.join(" "),
            nav.next.map(|_| " ▶").unwrap_or_default()
        );
        Ok(())
    }

    async fn post(&self, cmd: PostCommand) -> anyhow::Result<()> {
        require_session(self.api.session()).map_err(redirected)?;
        match cmd {
            PostCommand::Create {
                content,
                image,
                category,
            } => {
                let post = publish_post(&self.api, &content, image.as_deref(), category).await?;
                self.print_post(&post);
            }
            PostCommand::Edit { post_id, content } => {
                let post = revise_post(&self.api, &post_id, &content).await?;
                self.print_post(&post);
            }
            PostCommand::Delete { post_id } => {
                self.api.delete_post(&post_id).await?;
                println!("Deleted post {}", post_id);
            }
            PostCommand::Like { post_id } => {
                let post = self.api.like_post(&post_id).await?;
                self.print_post(&post);
            }
            PostCommand::Unlike { post_id } => {
                let post = self.api.unlike_post(&post_id).await?;
                self.print_post(&post);
            }
        }
        Ok(())
    }

    async fn comment(&self, cmd: CommentCommand) -> anyhow::Result<()> {
        require_session(self.api.session()).map_err(redirected)?;
        let post_id = match cmd {
            CommentCommand::Add {
                post_id,
                content,
                image,
            } => {
                publish_comment(&self.api, &post_id, None, &content, image.as_deref())
                    .await?;
                post_id
            }
            CommentCommand::Reply {
                post_id,
                parent_id,
                content,
                image,
            } => {
                publish_comment(
                    &self.api,
                    &post_id,
                    Some(&parent_id),
                    &content,
                    image.as_deref(),
                )
                .await?;
                post_id
            }
            CommentCommand::Edit {
                post_id,
                comment_id,
                content,
            } => {
                revise_comment(&self.api, &post_id, &comment_id, &content).await?;
                post_id
            }
            CommentCommand::Delete {
                post_id,
                comment_id,
            } => {
                self.api.delete_comment(&post_id, &comment_id).await?;
                post_id
            }
        };
        self.thread(&post_id, false).await
    }

    async fn thread(&self, post_id: &str, html: bool) -> anyhow::Result<()> {
        let session = require_session(self.api.session()).map_err(redirected)?;
        let comments = self.api.list_comments(post_id).await?;
        let tree = build_comment_tree(&comments);
        let ui = ThreadUi::new();
        let ctx = RenderContext {
            viewer_id: Some(&session.user.id),
            ui: &ui,
            dates: &self.dates,
        };
        let rendered = render_thread(&tree, &ctx);
        if html {
            let out = render::to_html(&rendered).context("Failed to render thread")?;
            println!("{}", out);
        } else if rendered.is_empty() {
            println!("No comments yet.");
        } else {
            print!("{}", render::to_text(&rendered));
        }
        Ok(())
    }

    async fn load_profile(&self, user_id: Option<String>) -> anyhow::Result<ProfilePage> {
        let session = require_session(self.api.session()).map_err(redirected)?;
        let user_id = user_id.unwrap_or(session.user.id);
        ProfilePage::load(self.api.clone(), self.dates, &user_id)
            .await
            .map_err(redirected)
    }

    async fn profile(&self, cmd: ProfileCommand) -> anyhow::Result<()> {
        match cmd {
            ProfileCommand::Show { user_id, page } => {
                let mut profile = self.load_profile(user_id).await?;
                checked(profile.error.is_none(), &profile.error)?;
                profile.set_page(page);
                self.print_profile(&profile);
                Ok(())
            }
            ProfileCommand::Edit {
                display_name,
                username,
                bio,
            } => {
                let mut profile = self.load_profile(None).await?;
                let current = profile
                    .profile
                    .clone()
                    .ok_or_else(|| anyhow!("Failed to load profile."))?;
                let display_name = display_name.unwrap_or(current.display_name);
                let username = username.unwrap_or(current.username);
                let bio = bio.or(current.bio).unwrap_or_default();
                let ok = profile.update_profile(&display_name, &username, &bio).await;
                checked(ok, &profile.error)?;
                self.whoami()
            }
            ProfileCommand::Image { path } => {
                let mut profile = self.load_profile(None).await?;
                let ok = profile.change_profile_image(&path).await;
                checked(ok, &profile.error)?;
                println!("Profile image updated.");
                Ok(())
            }
            ProfileCommand::Header { path } => {
                let mut profile = self.load_profile(None).await?;
                let ok = profile.change_header_image(&path).await;
                checked(ok, &profile.error)?;
                println!("Header image updated.");
                Ok(())
            }
            ProfileCommand::Color { color } => {
                let mut profile = self.load_profile(None).await?;
                let ok = profile.change_name_color(&color).await;
                checked(ok, &profile.error)?;
                println!("Name color set to {}.", color);
                Ok(())
            }
        }
    }

    fn print_profile(&self, page: &ProfilePage) {
        if let Some(user) = &page.profile {
            println!("{} (@{})", user.display_name, user.username);
            if let Some(bio) = &user.bio {
                println!("  {}", bio);
            }
            if let Some(joined) = &user.created_at {
                println!("  Joined {}", self.dates.date(joined));
            }
        }
        println!();
        println!("Posts (page {} of {})", page.page, page.total_pages().max(1));
        for post in page.visible_posts() {
            self.print_post(post);
        }
        println!();
        println!("Guestbook");
        if page.guestbook.is_empty() {
            println!("  No entries yet.");
        }
        for entry in &page.guestbook {
            println!(
                "  [{}] {} · {}: {}",
                entry.id,
                entry.author_display_name,
                self.dates.time_ago(&entry.created_at),
                entry.content
            );
        }
    }

    async fn guestbook(&self, cmd: GuestbookCommand) -> anyhow::Result<()> {
        match cmd {
            GuestbookCommand::Write { user_id, content } => {
                let mut profile = self.load_profile(Some(user_id)).await?;
                let ok = profile.write_guestbook(&content).await;
                checked(ok, &profile.error)?;
                println!("Guestbook entry written.");
            }
            GuestbookCommand::Edit {
                user_id,
                entry_id,
                content,
            } => {
                let mut profile = self.load_profile(Some(user_id)).await?;
                let ok = profile.edit_guestbook(&entry_id, &content).await;
                checked(ok, &profile.error)?;
                println!("Guestbook entry updated.");
            }
            GuestbookCommand::Delete { user_id, entry_id } => {
                let mut profile = self.load_profile(Some(user_id)).await?;
                let ok = profile.delete_guestbook(&entry_id).await;
                checked(ok, &profile.error)?;
                println!("Guestbook entry deleted.");
            }
        }
        Ok(())
    }

    async fn notifications(&self, cmd: NotificationCommand) -> anyhow::Result<()> {
        require_session(self.api.session()).map_err(redirected)?;
        let mut bell = NotificationBell::new(self.api.clone());
        match cmd {
            NotificationCommand::List => {
                bell.apply(NotificationBell::fetch(&self.api).await?);
                if let Some(badge) = bell.badge() {
                    println!("{} unread", badge);
                }
                if bell.notifications.is_empty() {
                    println!("No notifications.");
                }
                for n in &bell.notifications {
                    self.print_notification(n);
                }
            }
            NotificationCommand::Read { notification_id } => {
                bell.apply(NotificationBell::fetch(&self.api).await?);
                match bell.click(&notification_id).await? {
                    Some(route) => println!("Open {}", route),
                    None => println!("Marked as read."),
                }
            }
            NotificationCommand::Delete { notification_id } => {
                bell.delete(&notification_id).await?;
                println!("Deleted notification {}", notification_id);
            }
            NotificationCommand::Clear => {
                bell.delete_all().await?;
                println!("All notifications deleted.");
            }
            NotificationCommand::Watch => self.watch_notifications().await?,
        }
        Ok(())
    }

    fn print_notification(&self, n: &Notification) {
        println!(
            "{} {}{} · {} [{}]",
            notifications::icon(&n.kind),
            if n.is_read { "" } else { "* " },
            n.message,
            self.dates.time_ago(&n.created_at),
            n.id
        );
    }

    async fn watch_notifications(&self) -> anyhow::Result<()> {
        let period = Duration::from_secs(self.config.notifications.poll_interval_secs.max(1));
        let (handle, mut updates) = NotificationBell::watch(self.api.clone(), period);
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    for n in snapshot.notifications.iter().rev() {
                        if seen.insert(n.id.clone()) {
                            self.print_notification(n);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        handle.join().await?;
        Ok(())
    }
}

