// Terminal front-end for the rental storefront

use anyhow::{anyhow, bail, Context, Result};
use car_rental_storefront::api::{ClientConfig, HttpRentalApi};
use car_rental_storefront::auth;
use car_rental_storefront::booking_estimate::{BookingEstimate, DateRange};
use car_rental_storefront::booking_flow::{BookingFlow, BookingState};
use car_rental_storefront::car_detail::{load_car_detail, CarDetailView};
use car_rental_storefront::car_search::{CarSearch, FilterField, SearchOutcome};
use car_rental_storefront::models::Car;
use car_rental_storefront::navigation::nav_links;
use car_rental_storefront::notice::{Notice, NoticeLevel};
use car_rental_storefront::profile::ProfileEditor;
use car_rental_storefront::session::{FileStorage, SessionStore};
use car_rental_storefront::validation::{LoginForm, RegisterForm, ValidationErrors};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: storefront <command> [args]

commands:
  search [key=value ...]        keys: name brand model category_id min_price max_price status
  car <id>
  quote <id> <from> <to>        dates as YYYY-MM-DD or RFC 3339
  book <id> <from> <to>
  register <email> <password> <username> <full_name> <phone> <license_number> <address>
  login <email> <password>
  logout
  whoami
  profile [key=value ...]       keys: full_name phone license_number address";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = ClientConfig::from_env()?;
    let api = Arc::new(HttpRentalApi::new(config)?);
    let session = Arc::new(SessionStore::hydrate(Box::new(FileStorage::from_env())));

    match command.as_str() {
        "search" => search(&api, rest).await,
        "car" => show_car(&api, rest).await,
        "quote" => quote(&api, rest).await,
        "book" => book(api, session, rest).await,
        "register" => register(&api, rest).await,
        "login" => login(&api, &session, rest).await,
        "logout" => {
            auth::logout(&session);
            println!("Signed out.");
            Ok(())
        }
        "whoami" => {
            whoami(&session);
            Ok(())
        }
        "profile" => profile(&api, &session, rest).await,
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    }
}

fn parse_pairs(args: &[String]) -> Result<Vec<(&str, &str)>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, got `{arg}`"))
        })
        .collect()
}

fn parse_car_id(arg: Option<&String>) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow!("missing car id"))?;
    raw.parse().with_context(|| format!("invalid car id `{raw}`"))
}

fn parse_date(arg: Option<&String>) -> Result<DateTime<Utc>> {
    let raw = arg.ok_or_else(|| anyhow!("missing date"))?;
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date `{raw}`"))?;
        return Ok(midnight.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("invalid date `{raw}`"))
}

fn print_car_line(car: &Car) {
    println!(
        "#{:<4} {} {} {} ({})  ${:.2}/day  [{}]",
        car.car_id, car.name, car.brand, car.model, car.year, car.rental_price_per_day, car.status
    );
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        };
        println!("[{tag}] {}", notice.message);
    }
}

fn print_validation(errors: &ValidationErrors) {
    for error in errors.errors() {
        println!("  {}: {}", error.field, error.message);
    }
}

async fn search(api: &HttpRentalApi, args: &[String]) -> Result<()> {
    let mut search = CarSearch::new();
    for (key, value) in parse_pairs(args)? {
        let field: FilterField = key.parse()?;
        search.edit(field, value);
    }
    search.submit();

    match search.fetch(api).await {
        SearchOutcome::Results(cars) => cars.iter().for_each(print_car_line),
        SearchOutcome::NoResults => println!("No cars match these filters."),
        SearchOutcome::Failed(message) => bail!("{message}"),
    }
    Ok(())
}

async fn fetch_car(api: &HttpRentalApi, car_id: i64) -> Result<Car> {
    match load_car_detail(api, car_id).await {
        CarDetailView::Loaded(car) => Ok(car),
        CarDetailView::NotFound => bail!("car {car_id} not found"),
        CarDetailView::Failed(message) => bail!("{message}"),
    }
}

async fn show_car(api: &HttpRentalApi, args: &[String]) -> Result<()> {
    let car = fetch_car(api, parse_car_id(args.first())?).await?;

    print_car_line(&car);
    println!("  category: {}", car.category_name());
    println!("  plate:    {}", car.license_plate);
    println!("  mileage:  {} km", car.current_mileage);
    if let Some(description) = &car.description {
        println!("  \"{description}\"");
    }
    if !car.bookings.is_empty() {
        println!("  recent activity:");
        for booking in &car.bookings {
            let who = booking
                .customer
                .as_ref()
                .map(|c| c.full_name.as_str())
                .unwrap_or("unknown customer");
            println!("    #{} {} ({})", booking.booking_id, who, booking.status);
        }
    }
    Ok(())
}

async fn quote(api: &HttpRentalApi, args: &[String]) -> Result<()> {
    let car = fetch_car(api, parse_car_id(args.first())?).await?;
    let range = DateRange::new(parse_date(args.get(1))?, parse_date(args.get(2))?);
    let estimate = BookingEstimate::compute(car.rental_price_per_day, &range);

    println!(
        "{} days x ${:.2} = ${:.2}",
        estimate.duration_days, car.rental_price_per_day, estimate.total_price
    );
    Ok(())
}

async fn book(
    api: Arc<HttpRentalApi>,
    session: Arc<SessionStore>,
    args: &[String],
) -> Result<()> {
    let car = fetch_car(&api, parse_car_id(args.first())?).await?;
    let from = parse_date(args.get(1))?;
    let to = parse_date(args.get(2))?;

    let flow = BookingFlow::new(api, session, car);
    if let BookingState::Redirect(route) = flow.request_reservation(Utc::now()) {
        print_notices(flow.notices().drain());
        println!("Go to {route} first.");
        return Ok(());
    }

    let estimate = flow.select_dates(from, to, Utc::now())?;
    println!(
        "Requesting {} days for ${:.2}",
        estimate.duration_days, estimate.total_price
    );
    if !flow.can_confirm() {
        bail!("select a range of at least one day");
    }

    let result = flow.confirm().await;
    print_notices(flow.notices().drain());
    let car = result?;
    println!("{} now shows {} recent booking(s).", car.name, car.bookings.len());
    Ok(())
}

async fn register(api: &HttpRentalApi, args: &[String]) -> Result<()> {
    let [email, password, username, full_name, phone, license_number, address] = args else {
        bail!("register takes 7 arguments\n\n{USAGE}");
    };
    let form = RegisterForm {
        email: email.clone(),
        password: password.clone(),
        username: username.clone(),
        full_name: full_name.clone(),
        phone: phone.clone(),
        license_number: license_number.clone(),
        address: address.clone(),
    };

    match auth::register(api, &form).await {
        Ok(next) => {
            println!("Account created. Continue at {next}.");
            Ok(())
        }
        Err(auth::AuthError::Validation(errors)) => {
            print_validation(&errors);
            bail!("registration form is invalid")
        }
        Err(e) => Err(e.into()),
    }
}

async fn login(api: &HttpRentalApi, session: &SessionStore, args: &[String]) -> Result<()> {
    let [email, password] = args else {
        bail!("login takes <email> <password>");
    };

    match auth::login(api, session, &LoginForm::new(email.as_str(), password.as_str())).await {
        Ok(user) => {
            println!("Signed in as {} ({}).", user.username, user.email);
            Ok(())
        }
        Err(auth::AuthError::Validation(errors)) => {
            print_validation(&errors);
            bail!("login form is invalid")
        }
        Err(e) => Err(e.into()),
    }
}

fn whoami(session: &SessionStore) {
    let state = session.state();
    match state.user() {
        Some(user) => println!("{} <{}> ({})", user.username, user.email, user.role),
        None => println!("Not signed in."),
    }
    let links: Vec<&str> = nav_links(&state).iter().map(|link| link.label).collect();
    println!("menu: {}", links.join(" | "));
}

async fn profile(api: &HttpRentalApi, session: &SessionStore, args: &[String]) -> Result<()> {
    let mut editor = ProfileEditor::new();
    let loaded = editor.load(api, session).await.cloned();
    print_notices(editor.notices().drain());
    let loaded = loaded?;
    println!(
        "{} <{}>  wallet: ${}",
        loaded.profile.full_name, loaded.user.email, loaded.profile.wallet_balance
    );

    let edits = parse_pairs(args)?;
    if edits.is_empty() {
        return Ok(());
    }
    for (key, value) in edits {
        let slot = match key {
            "full_name" => &mut editor.form.full_name,
            "phone" => &mut editor.form.phone,
            "license_number" => &mut editor.form.license_number,
            "address" => &mut editor.form.address,
            other => bail!("unknown profile field `{other}`"),
        };
        *slot = value.to_string();
    }

    let saved = editor.save(api, session).await.map(|_| ());
    print_notices(editor.notices().drain());
    Ok(saved?)
}
