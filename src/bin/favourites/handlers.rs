use std::sync::Arc;

use meal_favourites::{
    catalog::Catalog,
    data::{MenuSection, RestaurantId},
    favourites::FavouritesStore,
    view::{CatalogView, RestaurantRow, ViewMode},
};

const HELP: &str = "\
Commands:
  all            show every restaurant
  favs           show favourite restaurants
  fav <id>       add or remove a favourite
  menu <id>      show the menu of a restaurant
  reset          forget all favourites
  help           show this message
  quit           leave";

#[derive(Debug, PartialEq)]
enum Command {
    Tab(ViewMode),
    Toggle(RestaurantId),
    Menu(RestaurantId),
    Reset,
    Help,
    Quit,
}

impl Command {
    // I need:
    //  <cmd> [id]
    fn new(args: &[&str]) -> Result<Self, &'static str> {
        let Some(&name) = args.first() else {
            return Err("empty command");
        };

        let id = || -> Result<RestaurantId, &'static str> {
            let Some(arg) = args.get(1) else {
                return Err("too less argument");
            };
            arg.parse()
                .map_err(|_| "Can not parse your argument into number")
        };

        match name {
            "all" => Ok(Self::Tab(ViewMode::All)),
            "favs" => Ok(Self::Tab(ViewMode::FavouritesOnly)),
            "fav" => Ok(Self::Toggle(id()?)),
            "menu" => Ok(Self::Menu(id()?)),
            "reset" => Ok(Self::Reset),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err("unexpected command"),
        }
    }
}

pub(super) struct App {
    catalog: Arc<Catalog>,
    store: FavouritesStore,
    all: CatalogView,
    favourites: CatalogView,
    tab: ViewMode,
}

impl App {
    pub(super) fn new(catalog: Arc<Catalog>, store: FavouritesStore) -> Self {
        let all = CatalogView::new(Arc::clone(&catalog), &store, ViewMode::All);
        let favourites =
            CatalogView::new(Arc::clone(&catalog), &store, ViewMode::FavouritesOnly);
        Self {
            catalog,
            store,
            all,
            favourites,
            tab: ViewMode::All,
        }
    }

    /// Run one input line. Returns `false` when the user wants to leave.
    pub(super) async fn handle(&mut self, line: &str) -> bool {
        let arguments = line.split_whitespace().collect::<Vec<_>>();
        if arguments.is_empty() {
            return true;
        }

        let command = match Command::new(&arguments) {
            Ok(command) => command,
            Err(hint) => {
                println!("{hint}\n\n{HELP}");
                return true;
            }
        };

        match command {
            Command::Tab(mode) => {
                self.tab = mode;
                self.show_tab();
            }
            Command::Toggle(id) => {
                if !self.catalog.contains(id) {
                    println!("Incorrect id, no restaurant found");
                    return true;
                }
                let added = self.store.toggle(id).contains(id);
                println!("{}", if added { "Added." } else { "Removed." });
                self.show_tab();
            }
            Command::Menu(id) => match self.all.menu(id) {
                Some(sections) => println!("{}", render_menu(sections)),
                None => println!("Incorrect id, no restaurant found"),
            },
            Command::Reset => {
                self.store.reset().await;
                self.show_tab();
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }

        true
    }

    pub(super) fn show_tab(&mut self) {
        self.all.refresh_if_changed();
        self.favourites.refresh_if_changed();

        let view = match self.tab {
            ViewMode::All => &self.all,
            ViewMode::FavouritesOnly => &self.favourites,
        };
        println!("== {} ==", self.tab.title());
        if view.is_empty() {
            println!("(nothing here yet)");
        }
        for row in view.rows() {
            println!("{}", render_row(&row));
        }
    }

    pub(super) async fn shutdown(&self) {
        self.store.flush().await;
        tracing::info!("favourites saved, bye");
    }
}

fn render_row(row: &RestaurantRow<'_>) -> String {
    let heart = if row.is_favourite { "♥" } else { "♡" };
    let r = row.restaurant;
    format!(
        "{heart} {}. {} ({} mins)\n    {}",
        r.id, r.title, r.eta, r.tagline
    )
}

fn render_menu(sections: &[MenuSection]) -> String {
    sections.iter().fold(String::new(), |mut out, section| {
        out.push_str(&format!("-- {} --\n", section.title));
        for item in &section.contents {
            out.push_str(&format!("  {}", item.title));
            if let Some(price) = &item.price {
                out.push_str(&format!("  {price}"));
            }
            out.push('\n');
            if let Some(description) = &item.description {
                out.push_str(&format!("    {description}\n"));
            }
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_favourites::favourites::FAVOURITES_KEY;
    use meal_favourites::storage::MemoryStore;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::new(&["favs"]), Ok(Command::Tab(ViewMode::FavouritesOnly)));
        assert_eq!(Command::new(&["fav", "2"]), Ok(Command::Toggle(2)));
        assert_eq!(Command::new(&["menu", "3"]), Ok(Command::Menu(3)));
        assert_eq!(Command::new(&["fav"]), Err("too less argument"));
        assert_eq!(
            Command::new(&["menu", "two"]),
            Err("Can not parse your argument into number")
        );
        assert_eq!(Command::new(&["order"]), Err("unexpected command"));
    }

    #[test]
    fn menu_lists_sections_and_prices() {
        let catalog = Catalog::bundled().unwrap();
        let text = render_menu(catalog.menu(1).unwrap());
        assert!(text.starts_with("-- Gelato --\n  Vanilla  $4.50\n"));
        assert!(text.contains("-- Coffee --"));
    }

    #[tokio::test]
    async fn toggling_unknown_restaurant_is_ignored() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let store = FavouritesStore::load(Arc::new(MemoryStore::new()), FAVOURITES_KEY).await;
        let mut app = App::new(catalog, store);

        assert!(app.handle("fav 404").await);
        assert!(app.store.current().is_empty());

        assert!(app.handle("fav 2").await);
        assert!(app.store.is_favourite(2));
        assert!(!app.handle("quit").await);
    }
}
