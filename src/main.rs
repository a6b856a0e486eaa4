//! Tranx - command-line client for the Tranx community forum
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tranx::models::{AppSort, PostSort, channel_name, format_download_count, format_file_size};
use tranx::{
    AppDetailViewModel, AppListViewModel, BoardListViewModel, ClientProvider, Config,
    HomeViewModel, ImageUploader, LoginViewModel, PicuiClient, PostDetailViewModel,
    PreferencesStore, ProfileViewModel, Session, ThemeMode, UiState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = parse_args()?;
    match command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            print_version();
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load()?;
    let prefs = Arc::new(PreferencesStore::open_default()?);
    let provider = Arc::new(ClientProvider::http(&config));
    let session = Session::new(provider, prefs, config);

    match command {
        Command::Login { username } => login_cli(&session, username).await,
        Command::Logout => {
            session.logout().await?;
            println!("✓ Logged out");
            Ok(())
        }
        Command::Register { username } => register_cli(&session, username).await,
        Command::Server { url } => server_cli(&session, url.as_deref()),
        Command::Feed { board, sort } => feed_cli(&session, board, sort).await,
        Command::Boards => boards_cli(&session).await,
        Command::Post { id } => post_cli(&session, id).await,
        Command::Like { id } => {
            let result = PostDetailViewModel::new(session, id).like_post().await?;
            let verb = if result.is_liked { "Liked" } else { "Unliked" };
            println!("✓ {} post {} (♥ {})", verb, id, result.likes);
            Ok(())
        }
        Command::Coin { id, amount } => {
            let coins = PostDetailViewModel::new(session, id)
                .coin_post(amount)
                .await?;
            println!("✓ Gave {} coins to post {} ({} total)", amount, id, coins);
            Ok(())
        }
        Command::Comment {
            post,
            text,
            reply_to,
        } => {
            let comment = PostDetailViewModel::new(session, post)
                .add_comment(&text, reply_to)
                .await?;
            println!("✓ Comment {} posted", comment.id);
            Ok(())
        }
        Command::Checkin => checkin_cli(&session).await,
        Command::Profile => profile_cli(&session).await,
        Command::Apps { category, sort } => apps_cli(&session, category, sort).await,
        Command::App { package } => app_cli(&session, &package).await,
        Command::Upload { path } => upload_cli(&session, &path).await,
        Command::ImageToken { token } => {
            session.prefs().set_image_host_token(&token)?;
            println!("✓ Image host token saved");
            Ok(())
        }
        Command::Theme { mode } => theme_cli(&session, mode.as_deref()),
        Command::Help | Command::Version => Ok(()),
    }
}

/// CLI commands
enum Command {
    Login {
        username: Option<String>,
    },
    Logout,
    Register {
        username: Option<String>,
    },
    Server {
        url: Option<String>,
    },
    Feed {
        board: Option<i64>,
        sort: PostSort,
    },
    Boards,
    Post {
        id: i64,
    },
    Like {
        id: i64,
    },
    Coin {
        id: i64,
        amount: u8,
    },
    Comment {
        post: i64,
        text: String,
        reply_to: Option<i64>,
    },
    Checkin,
    Profile,
    Apps {
        category: Option<String>,
        sort: AppSort,
    },
    App {
        package: String,
    },
    Upload {
        path: PathBuf,
    },
    ImageToken {
        token: String,
    },
    Theme {
        mode: Option<String>,
    },
    Help,
    Version,
}

/// Value following `--name` or `-n`
fn flag_value<'a>(args: &'a [String], long: &str, short: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == long || a == short)
        .and_then(|i| args.get(i + 1))
}

fn parse_id(value: Option<&String>, what: &str) -> Result<i64> {
    let value = value.ok_or_else(|| anyhow::anyhow!("Missing {what}"))?;
    value
        .parse()
        .with_context(|| format!("Invalid {what}: {value}"))
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "login" => Ok(Command::Login {
            username: args.get(2).cloned(),
        }),
        "logout" => Ok(Command::Logout),
        "register" => Ok(Command::Register {
            username: args.get(2).cloned(),
        }),
        "server" => Ok(Command::Server {
            url: args.get(2).cloned(),
        }),

        "feed" | "home" => {
            let board = flag_value(&args, "--board", "-b")
                .map(|b| b.parse().with_context(|| format!("Invalid board id: {b}")))
                .transpose()?;
            let sort = match flag_value(&args, "--sort", "-s") {
                Some(s) => PostSort::from_str(s)
                    .ok_or_else(|| anyhow::anyhow!("Unknown sort: {s} (latest, reply, hot)"))?,
                None => PostSort::default(),
            };
            Ok(Command::Feed { board, sort })
        }
        "boards" => Ok(Command::Boards),
        "post" => Ok(Command::Post {
            id: parse_id(args.get(2), "post id")?,
        }),
        "like" => Ok(Command::Like {
            id: parse_id(args.get(2), "post id")?,
        }),
        "coin" => {
            let id = parse_id(args.get(2), "post id")?;
            let amount = args
                .get(3)
                .ok_or_else(|| anyhow::anyhow!("Missing coin amount (1-10)"))?;
            let amount = amount
                .parse()
                .with_context(|| format!("Invalid coin amount: {amount}"))?;
            Ok(Command::Coin { id, amount })
        }
        "comment" => {
            let post = parse_id(args.get(2), "post id")?;
            let text = args
                .get(3)
                .ok_or_else(|| anyhow::anyhow!("Missing comment text"))?
                .clone();
            let reply_to = flag_value(&args, "--reply", "-r")
                .map(|r| parse_id(Some(r), "comment id"))
                .transpose()?;
            Ok(Command::Comment {
                post,
                text,
                reply_to,
            })
        }
        "checkin" => Ok(Command::Checkin),
        "profile" | "me" => Ok(Command::Profile),

        "apps" => {
            let category = flag_value(&args, "--category", "-c").cloned();
            let sort = match flag_value(&args, "--sort", "-s") {
                Some(s) => AppSort::from_str(s).ok_or_else(|| {
                    anyhow::anyhow!("Unknown sort: {s} (download, rating, update)")
                })?,
                None => AppSort::default(),
            };
            Ok(Command::Apps { category, sort })
        }
        "app" => {
            let package = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing package name"))?
                .clone();
            Ok(Command::App { package })
        }

        "upload" => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing image file"))?;
            Ok(Command::Upload {
                path: PathBuf::from(path),
            })
        }
        "image-token" => {
            let token = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing image host token"))?
                .clone();
            Ok(Command::ImageToken { token })
        }
        "theme" => Ok(Command::Theme {
            mode: args.get(2).cloned(),
        }),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'tranx --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
Tranx - community forum client

USAGE:
    tranx [COMMAND]

ACCOUNT:
    login [username]                   Log in (prompts for missing fields)
    logout                             Log out and clear local data
    register [username]                Create an account
    server [url]                       Show or set the server address
      Examples:
        tranx server forum.example.org:4999
        tranx server https://forum.example.org

FORUM:
    feed [OPTIONS]                     Show the latest posts
      Options:
        -b, --board <id>               Only posts from this board
        -s, --sort <order>             latest, reply or hot (default: latest)
    boards                             List boards
    post <id>                          Show a post and its comments
    like <id>                          Like or unlike a post
    coin <id> <amount>                 Give 1-10 coins to a post
    comment <post> <text> [OPTIONS]    Comment on a post
      Options:
        -r, --reply <comment>          Reply to a comment instead
    checkin                            Daily check-in
    profile                            Show your profile

APP MARKET:
    apps [OPTIONS]                     List apps
      Options:
        -c, --category <name>          Only apps in this category
        -s, --sort <order>             download, rating or update
    app <package>                      Show app details

SETTINGS:
    upload <file>                      Upload an image to the image host
    image-token <token>                Set the image host token
    theme [light|dark|system]          Show or set the theme mode

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

ENVIRONMENT:
    RUST_LOG                           Log filter (default: warn)

CONFIG:
    {}
"#,
        tranx::LOGO,
        config_path
    );
}

fn print_version() {
    println!("tranx {}", tranx::VERSION);
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Loaded data, or the load error as an `anyhow` error
fn loaded<T>(state: UiState<T>) -> Result<T> {
    match state {
        UiState::Success(data) => Ok(data),
        UiState::Error(message) => Err(anyhow::anyhow!(message)),
        UiState::Loading => Err(anyhow::anyhow!("Still loading")),
    }
}

async fn login_cli(session: &Session, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = prompt("Password")?;

    println!("Logging in to {}...", session.prefs().server_url());
    LoginViewModel::new(session.clone())
        .login(&username, &password)
        .await?;
    println!("✓ Logged in as {}", username.trim());
    Ok(())
}

async fn register_cli(session: &Session, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = prompt("Password (at least 8 characters)")?;
    let confirm = prompt("Confirm password")?;

    LoginViewModel::new(session.clone())
        .register(&username, &password, &confirm)
        .await?;
    println!("✓ Registered, run: tranx login {}", username.trim());
    Ok(())
}

fn server_cli(session: &Session, url: Option<&str>) -> Result<()> {
    match url {
        Some(url) => {
            let stored = LoginViewModel::new(session.clone()).update_server_url(url)?;
            println!("✓ Server set to {}", stored);
        }
        None => println!("{}", session.prefs().server_url()),
    }
    Ok(())
}

async fn feed_cli(session: &Session, board: Option<i64>, sort: PostSort) -> Result<()> {
    let vm = HomeViewModel::new(session.clone());
    if let Some(board) = board {
        vm.select_board(Some(board)).await;
    }
    if sort != PostSort::default() {
        vm.change_sort(sort).await;
    }
    if board.is_none() && sort == PostSort::default() {
        vm.load().await;
    }
    let data = loaded(vm.state())?;

    let board_name = board
        .and_then(|id| data.boards.iter().find(|b| b.id == id))
        .map_or("All boards", |b| b.name.as_str());
    println!("\n{} · {}", board_name, sort);
    println!("{}", "─".repeat(60));

    if data.posts.is_empty() {
        println!("No posts yet.");
    }
    for post in data.posts {
        println!("\n#{} {} · {}", post.id, post.title, post.publisher);
        println!("{}", post.preview(80));
        println!(
            "♥ {}  🪙 {}  ★ {}  💬 {}",
            post.likes, post.coins, post.favorites, post.comment_count
        );
    }
    Ok(())
}

async fn boards_cli(session: &Session) -> Result<()> {
    let vm = BoardListViewModel::new(session.clone());
    vm.load().await;
    let boards = loaded(vm.state())?;

    println!("Boards:\n");
    for board in boards {
        match board.description {
            Some(desc) => println!("  {:>4}  {} - {}", board.id, board.name, desc),
            None => println!("  {:>4}  {}", board.id, board.name),
        }
    }
    Ok(())
}

async fn post_cli(session: &Session, id: i64) -> Result<()> {
    let vm = PostDetailViewModel::new(session.clone(), id);
    vm.load().await;
    let data = loaded(vm.state())?;
    let post = data.post;

    println!("\n{}", post.title);
    println!("{} · {}", post.publisher, post.publish_time);
    println!("{}", "─".repeat(60));
    println!("{}", post.content);
    if let Some(image) = &post.image_url {
        println!("\n🖼  {}", image);
    }
    println!(
        "\n♥ {}  🪙 {}  ★ {}  👁 {}",
        post.likes, post.coins, post.favorites, post.view_count
    );

    println!("\nComments ({})", data.comments.len());
    for comment in data.comments {
        println!(
            "\n  {} {} [{}]",
            comment.floor_label(),
            comment.username.as_deref().unwrap_or("anonymous"),
            comment.id
        );
        println!("  {}", comment.content.as_deref().unwrap_or_default());
        if let Some(replies) = comment.reply_count.filter(|n| *n > 0) {
            println!("  ↳ {} replies", replies);
        }
    }
    Ok(())
}

async fn checkin_cli(session: &Session) -> Result<()> {
    let response = ProfileViewModel::new(session.clone()).checkin().await?;
    let today = chrono::Local::now().format("%Y-%m-%d");
    println!("✓ Checked in for {}: {}", today, response.summary());
    Ok(())
}

async fn profile_cli(session: &Session) -> Result<()> {
    let vm = ProfileViewModel::new(session.clone());
    vm.load().await;
    let data = loaded(vm.state())?;
    let user = &data.user;

    println!("\n{} (#{})", user.username, user.id);
    println!(
        "Level {}  [{:>3.0}%]  🪙 {}",
        data.level(),
        data.level_progress() * 100.0,
        user.coin_balance()
    );
    if let Some(stats) = data.stats {
        println!(
            "Following {} · Followers {}",
            stats.following_count, stats.follower_count
        );
    }
    if data.checkin.checked_in {
        let at = data.checkin.check_time.as_deref().unwrap_or("today");
        println!("✓ Checked in ({})", at);
    } else if data.checkin.can_check {
        println!("Not checked in yet, run: tranx checkin");
    }
    Ok(())
}

async fn apps_cli(session: &Session, category: Option<String>, sort: AppSort) -> Result<()> {
    let vm = AppListViewModel::new(session.clone());
    vm.change_sort(sort).await;
    vm.select_category(category).await;
    let state = vm.state();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }

    for app in &state.apps {
        println!(
            "{:<40} {:<10} {:>9}  ⬇ {}  ★ {:.1}",
            app.name,
            app.version,
            format_file_size(app.size),
            format_download_count(app.download_count),
            app.rating
        );
        println!("  {}", app.package_name);
    }
    if state.has_more {
        println!("\n(more apps available)");
    }
    Ok(())
}

async fn app_cli(session: &Session, package: &str) -> Result<()> {
    let vm = AppDetailViewModel::new(session.clone(), package);
    vm.load().await;
    let app = loaded(vm.state())?;

    println!("\n{} {} ({})", app.name, app.version, app.package_name);
    println!("{}", "─".repeat(60));
    println!(
        "{}  ⬇ {}  ★ {:.1} ({} ratings)  🪙 {}",
        format_file_size(app.size),
        format_download_count(app.download_count),
        app.rating,
        app.rating_count,
        app.total_coins
    );
    if let Some(category) = &app.main_category {
        println!("Category: {}", category);
    }
    if let Some(channel) = &app.channel {
        println!("Channel: {}", channel_name(channel));
    }
    if let Some(developer) = &app.developer_name {
        println!("Developer: {}", developer);
    }
    if let Some(description) = &app.description {
        println!("\n{}", description);
    }
    if let Some(url) = &app.download_url {
        println!("\nDownload: {}", url);
        vm.record_download().await;
    }
    Ok(())
}

async fn upload_cli(session: &Session, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let config = session.config();
    let host = PicuiClient::from_config(config)?;
    let uploader = ImageUploader::new(Arc::new(host), Arc::clone(session.prefs()), config.upload_mode);

    println!("Uploading {} ({})...", file_name, mime);
    let url = uploader
        .upload_image(bytes, mime.essence_str(), &file_name)
        .await?;
    println!("✓ {}", url);
    Ok(())
}

fn theme_cli(session: &Session, mode: Option<&str>) -> Result<()> {
    let prefs = session.prefs();
    match mode {
        Some(name) => {
            let mode = ThemeMode::from_str(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown theme: {name} (light, dark, system)"))?;
            prefs.set_theme_mode(mode)?;
            println!("✓ Theme set to {}", mode);
        }
        None => {
            println!("Theme: {}", prefs.theme_mode());
            if let Some(color) = prefs.primary_color() {
                println!("Primary colour: {}", color.to_hex());
            }
        }
    }
    Ok(())
}
