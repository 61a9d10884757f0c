use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use tableside::api::{self, ImageUpload};
use tableside::session::SessionError;
use tableside::state::cart::Discounts;
use tableside::state::scan::{self, PersistedScan, ScanStoreError};
use tableside::{ApiClient, ApiError, ClientConfig, SessionStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Scan(#[from] ScanStoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("cannot read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("no table scanned; run `tableside scan <qr-token>` first")]
    NoTable,
}

#[derive(Parser, Debug)]
#[command(name = "tableside", about = "Table-ordering API client")]
struct Cli {
    #[arg(long, env = "API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TABLESIDE_SESSION_FILE", default_value = ".tableside/session.json")]
    session_file: PathBuf,

    #[arg(long, env = "TABLESIDE_SCAN_FILE", default_value = ".tableside/scan.json")]
    scan_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "TABLESIDE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, env = "TABLESIDE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    Logout,
    Me,
    Profile(ProfileArgs),
    /// Resolve a table QR token and remember the table.
    Scan {
        qr_token: String,
    },
    /// Forget the remembered table.
    Leave,
    Menu {
        #[arg(long)]
        restaurant: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Categories {
        #[arg(long)]
        restaurant: Option<String>,
    },
    Item {
        item_id: String,
    },
    Cart(CartCommand),
    Coins(CoinsCommand),
    Offers {
        #[arg(long)]
        restaurant: Option<String>,
    },
    Coupon {
        code: String,
        #[arg(long)]
        subtotal: f64,
    },
    /// Create a payment order for the current cart at the scanned table.
    Pay {
        #[arg(long)]
        coupon: Option<String>,
        #[arg(long, default_value_t = 0)]
        coins: u64,
        #[arg(long)]
        notes: Option<String>,
    },
    Verify {
        gateway_order_id: String,
        gateway_payment_id: String,
        signature: String,
    },
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    avatar: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Subcommand, Debug)]
enum CartSubcommand {
    Show {
        #[arg(long, default_value_t = 0.0)]
        coupon_discount: f64,
        #[arg(long, default_value_t = 0.0)]
        coin_discount: f64,
        #[arg(long, default_value_t = 0.05)]
        gst_rate: f64,
    },
    Add {
        menu_item_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        notes: Option<String>,
    },
    Set {
        item_id: String,
        quantity: u32,
    },
    Remove {
        item_id: String,
    },
    Clear,
}

#[derive(Args, Debug)]
struct CoinsCommand {
    #[command(subcommand)]
    command: CoinsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CoinsSubcommand {
    Balance,
    History,
    Preview { coins: u64 },
}

struct CliContext {
    client: ApiClient,
    scan_file: PathBuf,
}

// Queued replays go out in arrival order only on a single-threaded runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let env_config = ClientConfig::from_env();
    let config = match cli.base_url {
        Some(url) => ClientConfig::new(url)
            .with_cookie_name(env_config.refresh_cookie_name)
            .with_timeouts(env_config.timeouts),
        None => env_config,
    };

    let session = SessionStore::load_from(&cli.session_file)?;
    let ctx = CliContext { client: ApiClient::from_config(&config, session.clone())?, scan_file: cli.scan_file };

    let result = run(&ctx, cli.command).await;
    ctx.client.capture_refresh_cookie();
    // Written even on failure: a failed refresh has already cleared the tokens.
    session.save_to(&cli.session_file)?;
    if let Err(CliError::Api(err)) = &result {
        if err.requires_login() {
            tracing::warn!("session expired; run `tableside login` again");
        }
    }
    result
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    let client = &ctx.client;
    match command {
        Command::Login { email, password } => print_json(&api::auth::login(client, &email, &password).await?),
        Command::Signup { name, email, phone, password, avatar } => {
            let form = api::auth::SignupForm { name, email, phone, password, avatar: read_image(avatar.as_deref())? };
            print_json(&api::auth::signup(client, form).await?)
        }
        Command::Logout => {
            api::auth::logout(client).await?;
            println!("signed out");
            Ok(())
        }
        Command::Me => print_json(&api::auth::me(client).await?),
        Command::Profile(args) => run_profile(client, args).await,
        Command::Scan { qr_token } => {
            let result = api::qr::scan(client, &qr_token).await?;
            print_json(&scan::save(&ctx.scan_file, &result)?)
        }
        Command::Leave => {
            scan::clear(&ctx.scan_file)?;
            println!("table forgotten");
            Ok(())
        }
        Command::Menu { restaurant, category } => {
            let restaurant = restaurant_or_scanned(ctx, restaurant)?;
            print_json(&api::menu::list_menu(client, &restaurant, category.as_deref()).await?)
        }
        Command::Categories { restaurant } => {
            let restaurant = restaurant_or_scanned(ctx, restaurant)?;
            print_json(&api::menu::categories(client, &restaurant).await?)
        }
        Command::Item { item_id } => print_json(&api::menu::get_item(client, &item_id).await?),
        Command::Cart(cart) => run_cart(client, cart).await,
        Command::Coins(coins) => run_coins(client, coins).await,
        Command::Offers { restaurant } => {
            let restaurant = restaurant_or_scanned(ctx, restaurant)?;
            print_json(&api::offers::list_offers(client, &restaurant).await?)
        }
        Command::Coupon { code, subtotal } => print_json(&api::offers::apply_coupon(client, &code, subtotal).await?),
        Command::Pay { coupon, coins, notes } => {
            let table = scanned_table(ctx)?;
            let checkout = api::payment::CheckoutRequest {
                restaurant_id: table.restaurant_id,
                table_id: table.table_id,
                coupon_code: coupon,
                coins_to_redeem: coins,
                notes,
            };
            print_json(&api::payment::create_order(client, &checkout).await?)
        }
        Command::Verify { gateway_order_id, gateway_payment_id, signature } => {
            let verification = api::payment::PaymentVerification { gateway_order_id, gateway_payment_id, signature };
            print_json(&api::payment::verify_payment(client, &verification).await?)
        }
    }
}

async fn run_profile(client: &ApiClient, args: ProfileArgs) -> Result<(), CliError> {
    let update = api::profile::ProfileUpdate {
        name: args.name,
        phone: args.phone,
        avatar: read_image(args.avatar.as_deref())?,
    };
    if update.is_empty() {
        return print_json(&api::profile::get_profile(client).await?);
    }
    print_json(&api::profile::update_profile(client, update).await?)
}

async fn run_cart(client: &ApiClient, cart: CartCommand) -> Result<(), CliError> {
    match cart.command {
        CartSubcommand::Show { coupon_discount, coin_discount, gst_rate } => {
            let cart = api::cart::get_cart(client).await?;
            let bill = cart.bill(Discounts { coupon: coupon_discount, coins: coin_discount }, gst_rate);
            print_json(&serde_json::json!({ "cart": cart, "bill": bill }))
        }
        CartSubcommand::Add { menu_item_id, quantity, notes } => {
            let item = api::cart::AddToCart { menu_item_id, quantity, notes };
            print_json(&api::cart::add_item(client, &item).await?)
        }
        CartSubcommand::Set { item_id, quantity } => {
            print_json(&api::cart::update_quantity(client, &item_id, quantity).await?)
        }
        CartSubcommand::Remove { item_id } => print_json(&api::cart::remove_item(client, &item_id).await?),
        CartSubcommand::Clear => {
            api::cart::clear(client).await?;
            println!("cart cleared");
            Ok(())
        }
    }
}

async fn run_coins(client: &ApiClient, coins: CoinsCommand) -> Result<(), CliError> {
    match coins.command {
        CoinsSubcommand::Balance => print_json(&api::coins::balance(client).await?),
        CoinsSubcommand::History => print_json(&api::coins::history(client).await?),
        CoinsSubcommand::Preview { coins } => print_json(&api::coins::preview_redemption(client, coins).await?),
    }
}

fn scanned_table(ctx: &CliContext) -> Result<PersistedScan, CliError> {
    scan::load(&ctx.scan_file)?.ok_or(CliError::NoTable)
}

fn restaurant_or_scanned(ctx: &CliContext, restaurant: Option<String>) -> Result<String, CliError> {
    match restaurant {
        Some(id) => Ok(id),
        None => Ok(scanned_table(ctx)?.restaurant_id),
    }
}

fn read_image(path: Option<&Path>) -> Result<Option<ImageUpload>, CliError> {
    path.map(|path| {
        ImageUpload::from_path(path).map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })
    })
    .transpose()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
