use crate::command::{self, Command, HELP};
use crate::input::StdinInput;
use crate::notify::{flush, print_error};
use catalog::controller::{FormMode, ProductsController};
use catalog::model::{Product, ProductDraft};
use catalog::view;

enum Flow {
    Continue,
    Quit,
}

/// Read-eval loop over the products screen.
pub struct Console {
    controller: ProductsController,
    input: StdinInput,
    listing: Vec<Product>,
    draft: Option<(ProductDraft, FormMode)>,
}

impl Console {
    pub fn new(controller: ProductsController, input: StdinInput) -> Self {
        Console {
            controller,
            input,
            listing: Vec::new(),
            draft: None,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        print!("{}", view::render_header());
        self.refresh().await;

        loop {
            print!("> ");
            flush();

            let line = match self.input.next_line().await? {
                Some(line) => line,
                None => break,
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            let command = match command::parse(input) {
                Ok(command) => command,
                Err(err) => {
                    print_error(err);
                    continue;
                }
            };

            if let Flow::Quit = self.execute(command).await {
                break;
            }
        }

        Ok(())
    }

    // Failures from the controller were already notified.
    async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::List => self.refresh().await,
            Command::Search(term) => {
                self.controller.set_search_term(term);
                self.refresh().await;
            }
            Command::ToggleInactive => {
                self.controller.toggle_show_inactive();
                self.refresh().await;
            }
            Command::New => {
                self.controller.open_for_create();
                self.open_form();
            }
            Command::Edit(n) => {
                if let Some(product) = self.select(n) {
                    self.controller.open_for_edit(product);
                    self.open_form();
                }
            }
            Command::Set(field, value) => match &mut self.draft {
                Some((draft, mode)) => match field.apply(draft, &value) {
                    Ok(()) => print!("{}", view::render_form(draft, *mode)),
                    Err(err) => print_error(err),
                },
                None => print_error("No product form is open, use 'new' or 'edit <n>'"),
            },
            Command::Save => {
                let draft = match &self.draft {
                    Some((draft, _)) => draft.clone(),
                    None => {
                        print_error("No product form is open, use 'new' or 'edit <n>'");
                        return Flow::Continue;
                    }
                };
                if self.controller.submit(draft).await.is_ok() {
                    self.draft = None;
                    self.refresh().await;
                }
            }
            Command::Cancel => {
                self.controller.close_modal();
                self.draft = None;
            }
            Command::Toggle(n) => {
                if let Some(product) = self.select(n) {
                    if self.controller.toggle_active(&product).await.is_ok() {
                        self.refresh().await;
                    }
                }
            }
            Command::Delete(n) => {
                if let Some(product) = self.select(n) {
                    if self.controller.delete(product.id).await.is_ok() {
                        self.refresh().await;
                    }
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    fn open_form(&mut self) {
        let modal = self.controller.modal();
        self.draft = self.controller.draft().zip(modal.mode());

        if let Some((draft, mode)) = &self.draft {
            print!("{}", view::render_form(draft, *mode));
        }
    }

    fn select(&self, n: usize) -> Option<Product> {
        let product = self.listing.get(n - 1).cloned();
        if product.is_none() {
            print_error(format!("No product number {}", n));
        }
        product
    }

    async fn refresh(&mut self) {
        if let Ok(products) = self.controller.products().await {
            self.listing = products;
        }

        print!(
            "{}",
            view::render_filters(
                &self.controller.search_term(),
                self.controller.show_inactive()
            )
        );
        print!("{}", view::render_list(&self.listing));
    }
}
