//! Menu-driven dashboard session.

use airq_core::{Location, Session};
use anyhow::Result;
use inquire::{InquireError, Select, Text};
use std::fmt;

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    Readings,
    Map,
    Forecast,
    ToggleFavourite,
    Favourites,
    ChangeLocation,
    Quit,
}

impl Action {
    const ALL: [Action; 8] = [
        Action::Refresh,
        Action::Readings,
        Action::Map,
        Action::Forecast,
        Action::ToggleFavourite,
        Action::Favourites,
        Action::ChangeLocation,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh",
            Action::Readings => "Current readings",
            Action::Map => "Station map",
            Action::Forecast => "Forecast for a location",
            Action::ToggleFavourite => "Star / unstar a location",
            Action::Favourites => "Favourites",
            Action::ChangeLocation => "Change weather location",
            Action::Quit => "Quit",
        })
    }
}

/// A monitoring location as offered in pick lists.
#[derive(Debug, Clone)]
struct LocationChoice {
    city: String,
    location: String,
    label: String,
}

impl fmt::Display for LocationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn location_choices(session: &Session) -> Vec<LocationChoice> {
    session
        .city_groups()
        .iter()
        .flat_map(|g| g.locations.iter())
        .map(|r| {
            let star = if session.favourites().contains(&r.city, &r.location) { "* " } else { "" };
            LocationChoice {
                city: r.city.clone(),
                location: r.location.clone(),
                label: format!(
                    "{star}{} / {}  (AQI {}, {})",
                    r.city,
                    r.location,
                    render::fmt_aqi(r.aqi),
                    r.status().label
                ),
            }
        })
        .collect()
}

/// `Ok(None)` when the user backed out of the prompt with Esc.
fn optional<T>(res: Result<T, InquireError>) -> Result<Option<T>, InquireError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e),
    }
}

fn pick_location(session: &Session) -> Result<Option<LocationChoice>> {
    let choices = location_choices(session);
    if choices.is_empty() {
        println!("No readings loaded. Try Refresh.");
        return Ok(None);
    }
    Ok(optional(Select::new("Location:", choices).with_page_size(15).prompt())?)
}

pub async fn run(mut session: Session) -> Result<()> {
    session.refresh().await;
    print!("{}", render::dashboard(&session));

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(a) => a,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::Refresh => {
                tracing::info!("refreshing dashboard");
                session.refresh().await;
                print!("{}", render::dashboard(&session));
            }
            Action::Readings => {
                print!("{}", render::readings(&session.city_groups(), session.favourites()));
            }
            Action::Map => print!("{}", render::stations(&session.stations())),
            Action::Forecast => {
                if let Some(choice) = pick_location(&session)? {
                    println!("Loading AQI trend for {}, {}...", choice.location, choice.city);
                    let panel = session.load_forecast(&choice.city, &choice.location).await;
                    print!("{}", render::forecast(panel));
                }
            }
            Action::ToggleFavourite => {
                if let Some(choice) = pick_location(&session)? {
                    let LocationChoice { city, location, .. } = &choice;
                    match session.toggle_favourite(city, location) {
                        Some(true) => println!("Added {location}, {city} to favourites"),
                        Some(false) => println!("Removed {location}, {city} from favourites"),
                        None => println!("{location}, {city} is no longer reported"),
                    }
                }
            }
            Action::Favourites => print!("{}", render::favourites(session.favourites())),
            Action::ChangeLocation => change_location(&mut session).await?,
            Action::Quit => break,
        }
    }

    Ok(())
}

async fn change_location(session: &mut Session) -> Result<()> {
    let Some(query) = optional(Text::new("Search place:").prompt())? else {
        return Ok(());
    };

    let found = match session.search(&query).await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!("Error searching places: {err:#}");
            println!("Search failed: {err}");
            return Ok(());
        }
    };

    if found.is_empty() {
        println!("No matching places.");
        return Ok(());
    }

    let names: Vec<String> = found.iter().map(|s| s.display_name.clone()).collect();
    let Some(picked) = optional(Select::new("Place:", names).raw_prompt())? else {
        return Ok(());
    };

    let location = Location::from(found[picked.index].clone());
    session.set_location(location).await;
    print!("{}", render::weather(session.location(), session.weather()));
    Ok(())
}
