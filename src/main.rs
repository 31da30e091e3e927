use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use solarcrm::analytics::{
    all_time_totals, assignees, categories, category_rollup, current_month_stats, low_stock,
    monthly_metrics, search_customers, search_invoices, summarize, task_status_counts,
    AlertLevel, ProductFilter, TaskFilter, TRAILING_MONTHS,
};
use solarcrm::config::{config_dir, init_config_dir, load_config, resolve_dir, Config};
use solarcrm::error::{CrmError, Result};
use solarcrm::export::{backup_file_name, backup_json, csv_file_name, export_collection};
use solarcrm::invoice::{resolve_line_items, InvoiceDraft};
use solarcrm::model::{
    parse_date_input, parse_instant, Customer, CustomerUpdate, Invoice, Product, ProductUpdate,
    Status, Task, TaskType, TaskUpdate,
};
use solarcrm::pdf::{pdf_file_name, write_invoice_pdf, InvoiceDocument};
use solarcrm::store::{open_store, Collection, DocumentStore};
use solarcrm::AppState;

#[derive(Parser)]
#[command(name = "solarcrm")]
#[command(version, about = "Customer and installation tracker for solar installers", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config and empty data store
    Init,

    /// Show configuration and record counts
    Status,

    /// This month at a glance: stats, alerts, recent customers, upcoming tasks
    Dashboard,

    /// Six-month trends and inventory value by category
    Analytics,

    /// Manage customers
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Manage inventory
    #[command(subcommand)]
    Products(ProductCommand),

    /// Manage installation, maintenance and inspection tasks
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// Create, list and render invoices
    #[command(subcommand)]
    Invoices(InvoiceCommand),

    /// Export a collection as CSV
    Export {
        /// customers, products, tasks or invoices
        collection: Collection,

        /// Output file (default: ./<collection>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a JSON backup of every collection
    Backup {
        /// Output file (default: ./solar-crm-backup-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CustomerCommand {
    /// List customers
    List {
        /// Filter by name, email or phone
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        /// System size in kW
        #[arg(long, default_value_t = 0.0)]
        capacity: f64,
        /// Monthly electricity bill
        #[arg(long, default_value_t = 0.0)]
        bill: f64,
        /// Installation date (YYYY-MM-DD)
        #[arg(long)]
        installed: Option<String>,
        /// pending, in-progress or completed
        #[arg(long, default_value = "pending")]
        status: Status,
    },

    /// Change fields of a customer
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long)]
        bill: Option<f64>,
        #[arg(long)]
        installed: Option<String>,
        #[arg(long)]
        status: Option<Status>,
    },

    /// Delete a customer
    Delete { id: String },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// List inventory
    List {
        /// Filter by name or vendor
        #[arg(short, long)]
        search: Option<String>,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
        /// Only items at or below their minimum threshold
        #[arg(long)]
        low_stock: bool,
    },

    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long, default_value = "")]
        vendor: String,
        #[arg(long)]
        unit_cost: f64,
        #[arg(long, default_value_t = 0)]
        min_threshold: u32,
    },

    /// Change fields of a product
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        unit_cost: Option<f64>,
        #[arg(long)]
        min_threshold: Option<u32>,
    },

    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks
    List {
        /// Filter by customer name or assignee
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Schedule a task for a customer
    Add {
        /// Customer id
        #[arg(long)]
        customer: String,
        /// installation, maintenance or inspection
        #[arg(long = "type", default_value = "installation")]
        kind: TaskType,
        #[arg(long, default_value = "")]
        assignee: String,
        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        scheduled: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value = "pending")]
        status: Status,
    },

    /// Change fields of a task
    Update {
        id: String,
        #[arg(long = "type")]
        kind: Option<TaskType>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        scheduled: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        status: Option<Status>,
    },

    /// Move a task to a new status
    Status { id: String, status: Status },

    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum InvoiceCommand {
    /// List invoices
    List {
        /// Filter by customer name or invoice id
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one invoice with its line items
    Show { id: String },

    /// Create an invoice for a customer
    Create {
        /// Customer id
        #[arg(long)]
        customer: String,

        /// Catalog line in format "product-id:quantity" (can be repeated)
        #[arg(short, long, value_name = "PRODUCT:QTY")]
        item: Vec<String>,

        /// Custom line in format "name:quantity:unit_cost" (can be repeated)
        #[arg(long, value_name = "NAME:QTY:COST")]
        custom: Vec<String>,

        /// Installation date (YYYY-MM-DD)
        #[arg(long)]
        installed: String,

        /// Flat tax amount added to the subtotal
        #[arg(long, default_value_t = 0.0)]
        taxes: f64,

        /// Company address printed on this invoice (default: from config)
        #[arg(long)]
        company_address: Option<String>,

        /// GST number printed on this invoice (default: from config)
        #[arg(long)]
        gst: Option<String>,

        #[arg(long)]
        signatory: Option<String>,

        /// Also render the PDF into the output directory
        #[arg(long)]
        pdf: bool,
    },

    /// Render an invoice PDF
    Pdf {
        id: String,

        /// Custom output file path (default: output_dir/invoice-<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "solarcrm=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loaded config, open store and a snapshot of every collection
struct Session {
    cfg_dir: PathBuf,
    config: Config,
    store: Box<dyn DocumentStore>,
    state: AppState,
}

impl Session {
    fn open(cfg_dir: PathBuf) -> Result<Self> {
        if !cfg_dir.exists() {
            return Err(CrmError::ConfigNotFound(cfg_dir));
        }

        let config = load_config(&cfg_dir)?;
        let store = open_store(&config.store, &cfg_dir)?;
        let state = AppState::load(store.as_ref())?;
        debug!(counts = ?state.counts(), "loaded snapshot");

        Ok(Self {
            cfg_dir,
            config,
            store,
            state,
        })
    }

    fn money(&self, value: f64) -> String {
        format_money(value, &self.config.invoice.currency_symbol)
    }
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    if let Commands::Init = cli.command {
        return cmd_init(&cfg_dir);
    }

    let mut session = Session::open(cfg_dir)?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Status => cmd_status(&session),
        Commands::Dashboard => cmd_dashboard(&session, today),
        Commands::Analytics => cmd_analytics(&session, today),
        Commands::Customers(cmd) => cmd_customers(&mut session, cmd),
        Commands::Products(cmd) => cmd_products(&mut session, cmd),
        Commands::Tasks(cmd) => cmd_tasks(&mut session, cmd),
        Commands::Invoices(cmd) => cmd_invoices(&mut session, cmd),
        Commands::Export { collection, output } => cmd_export(&session, collection, output),
        Commands::Backup { output } => cmd_backup(&session, output),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized solarcrm config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Add your first customer:    solarcrm customers add --name <name>");
    println!("  3. Stock your inventory:       solarcrm products add --name <name> --quantity <n> --unit-cost <cost>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "CAPACITY")]
    capacity: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
}

impl CustomerRow {
    fn new(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            capacity: format!("{:.1} kW", customer.solar_capacity),
            status: customer.status.to_string(),
            installed: display_date(customer.installation_date.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "QTY")]
    quantity: u32,
    #[tabled(rename = "MIN")]
    min_threshold: u32,
    #[tabled(rename = "VENDOR")]
    vendor: String,
    #[tabled(rename = "UNIT COST")]
    unit_cost: String,
    #[tabled(rename = "STOCK")]
    stock: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "ASSIGNEE")]
    assignee: String,
    #[tabled(rename = "SCHEDULED")]
    scheduled: String,
}

impl TaskRow {
    fn new(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            customer: task.customer_name.clone(),
            kind: task.kind.to_string(),
            status: task.status.to_string(),
            assignee: task.assigned_to.clone(),
            scheduled: display_date(Some(task.scheduled_date.as_str())),
        }
    }
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "ITEMS")]
    items: usize,
    #[tabled(rename = "TOTAL")]
    total: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    name: String,
    #[tabled(rename = "SOURCE")]
    source: &'static str,
    #[tabled(rename = "QTY")]
    quantity: f64,
    #[tabled(rename = "UNIT COST")]
    unit_cost: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "INSTALLATIONS")]
    installations: usize,
    #[tabled(rename = "CAPACITY")]
    capacity: String,
    #[tabled(rename = "REVENUE")]
    revenue: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "STOCK VALUE")]
    value: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_money(value: f64, currency_symbol: &str) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = format_grouped_int(whole.parse::<i64>().unwrap_or(0));
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };

    format!("{sign}{currency_symbol}{grouped}.{frac}")
}

fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_instant)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Validate a YYYY-MM-DD argument and return it in stored form
fn date_arg(raw: &str) -> Result<String> {
    Ok(parse_date_input(raw)?.format("%Y-%m-%d").to_string())
}

fn non_negative(value: f64, field: &'static str) -> Result<f64> {
    if value < 0.0 {
        return Err(CrmError::NegativeValue(field));
    }
    Ok(value)
}

/// Show configuration and record counts
fn cmd_status(session: &Session) -> Result<()> {
    let config = &session.config;
    let counts = session.state.counts();

    println!("SolarCRM Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", session.cfg_dir.display());
    println!("Company:          {}", config.company.name);

    match config.store.backend.as_str() {
        "http" => println!(
            "Store:            http ({})",
            config.store.base_url.as_deref().unwrap_or("-")
        ),
        _ => println!(
            "Store:            file ({})",
            resolve_dir(&config.store.data_dir, &session.cfg_dir).display()
        ),
    }

    println!("Customers:        {}", counts.customers);
    println!("Products:         {}", counts.products);
    println!("Tasks:            {}", counts.tasks);
    println!("Invoices:         {}", counts.invoices);

    Ok(())
}

fn cmd_dashboard(session: &Session, today: NaiveDate) -> Result<()> {
    let dashboard = summarize(&session.state, today);
    let month = &dashboard.month;

    println!("Dashboard - {}", today.format("%B %Y"));
    println!("{}", "-".repeat(50));
    println!("Total customers:          {}", dashboard.total_customers);
    println!("New customers this month: {}", month.new_customers);
    println!("Installations this month: {}", month.installations);
    println!("Capacity this month:      {:.1} kW", month.total_kw);
    println!("Revenue this month:       {}", session.money(month.revenue));
    println!("Pending installations:    {}", dashboard.pending_installations);
    println!("Low stock items:          {}", dashboard.low_stock);

    if !dashboard.alerts.is_empty() {
        println!();
        println!("Alerts:");
        for alert in &dashboard.alerts {
            let marker = match alert.level {
                AlertLevel::Warning => "!",
                AlertLevel::Info => "i",
            };
            println!("  {marker} {}", alert.message);
        }
    }

    println!();
    println!("Recent customers:");
    if dashboard.recent_customers.is_empty() {
        println!("  No customers yet.");
    } else {
        let rows: Vec<CustomerRow> = dashboard
            .recent_customers
            .iter()
            .map(|c| CustomerRow::new(c))
            .collect();
        println!("{}", render(rows));
    }

    println!();
    println!("Upcoming tasks:");
    if dashboard.upcoming_tasks.is_empty() {
        println!("  Nothing scheduled.");
    } else {
        let rows: Vec<TaskRow> = dashboard
            .upcoming_tasks
            .iter()
            .map(|t| TaskRow::new(t))
            .collect();
        println!("{}", render(rows));
    }

    Ok(())
}

fn cmd_analytics(session: &Session, today: NaiveDate) -> Result<()> {
    let state = &session.state;

    println!("Last {TRAILING_MONTHS} months");
    if state.customers.is_empty() && state.tasks.is_empty() && state.invoices.is_empty() {
        println!("No installation data yet. Add customers, tasks and invoices to see trends.");
    } else {
        let rows: Vec<MonthRow> =
            monthly_metrics(&state.customers, &state.tasks, &state.invoices, today)
                .into_iter()
                .map(|m| MonthRow {
                    month: m.month,
                    installations: m.installations,
                    capacity: format!("{:.1} kW", m.total_kw),
                    revenue: session.money(m.revenue),
                })
                .collect();
        println!("{}", render(rows));

        let month = current_month_stats(&state.customers, &state.tasks, &state.invoices, today);
        println!();
        println!("This month:");
        println!("  New customers:  {}", month.new_customers);
        println!("  Installations:  {}", month.installations);
        println!("  Capacity:       {:.1} kW", month.total_kw);
        println!("  Revenue:        {}", session.money(month.revenue));

        let totals = all_time_totals(&state.customers, &state.tasks, &state.invoices);
        println!();
        println!("All time:");
        println!("  Completed tasks: {}", totals.completed_tasks);
        println!("  Capacity:        {:.1} kW", totals.total_kw);
        println!("  Revenue:         {}", session.money(totals.revenue));
    }

    println!();
    println!("Inventory value by category");
    let rollup = category_rollup(&state.products);
    if rollup.is_empty() {
        println!("No products in inventory yet.");
    } else {
        let rows: Vec<CategoryRow> = rollup
            .into_iter()
            .map(|c| CategoryRow {
                category: c.name,
                value: session.money(c.value),
            })
            .collect();
        println!("{}", render(rows));
    }

    Ok(())
}

fn cmd_customers(session: &mut Session, cmd: CustomerCommand) -> Result<()> {
    match cmd {
        CustomerCommand::List { search } => {
            let customers: Vec<&Customer> = match search.as_deref() {
                Some(term) => search_customers(&session.state.customers, term),
                None => session.state.customers.iter().collect(),
            };

            if customers.is_empty() {
                println!("No customers found.");
                return Ok(());
            }

            let rows: Vec<CustomerRow> = customers.iter().map(|c| CustomerRow::new(c)).collect();
            println!("{}", render(rows));
            println!();
            println!("Total: {} customers", customers.len());
        }
        CustomerCommand::Add {
            name,
            phone,
            email,
            address,
            capacity,
            bill,
            installed,
            status,
        } => {
            let customer = Customer {
                id: String::new(),
                name,
                phone,
                email,
                address,
                solar_capacity: non_negative(capacity, "capacity")?,
                monthly_bill: non_negative(bill, "bill")?,
                installation_date: installed.as_deref().map(date_arg).transpose()?,
                status,
                created_at: None,
            };
            let added = session
                .state
                .add_customer(session.store.as_ref(), customer)?;
            println!("Added customer {} ({})", added.name, added.id);
        }
        CustomerCommand::Update {
            id,
            name,
            phone,
            email,
            address,
            capacity,
            bill,
            installed,
            status,
        } => {
            let update = CustomerUpdate {
                name,
                phone,
                email,
                address,
                solar_capacity: capacity.map(|v| non_negative(v, "capacity")).transpose()?,
                monthly_bill: bill.map(|v| non_negative(v, "bill")).transpose()?,
                installation_date: installed.as_deref().map(date_arg).transpose()?,
                status,
            };
            let updated = session
                .state
                .update_customer(session.store.as_ref(), &id, &update)?;
            println!("Updated customer {} ({})", updated.name, updated.id);
        }
        CustomerCommand::Delete { id } => {
            session.state.delete_customer(session.store.as_ref(), &id)?;
            println!("Deleted customer {id}");
        }
    }
    Ok(())
}

fn cmd_products(session: &mut Session, cmd: ProductCommand) -> Result<()> {
    match cmd {
        ProductCommand::List {
            search,
            category,
            low_stock: only_low,
        } => {
            let filter = ProductFilter { search, category };
            let mut products: Vec<&Product> = filter.apply(&session.state.products);
            if only_low {
                products.retain(|p| p.is_low_stock());
            }

            if products.is_empty() {
                println!("No products found.");
                return Ok(());
            }

            let rows: Vec<ProductRow> = products
                .iter()
                .map(|p| ProductRow {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    category: p.category.clone(),
                    quantity: p.quantity,
                    min_threshold: p.min_threshold,
                    vendor: p.vendor.clone(),
                    unit_cost: session.money(p.unit_cost),
                    stock: p.stock_level().to_string(),
                })
                .collect();
            println!("{}", render(rows));

            let value: f64 = products.iter().map(|p| p.stock_value()).sum();
            let low = low_stock(&session.state.products).len();
            println!();
            println!("Stock value: {}", session.money(value));
            if low > 0 {
                println!("Low stock:   {low} item(s) at or below minimum");
            }
            let known = categories(&session.state.products);
            if !known.is_empty() {
                println!("Categories:  {}", known.join(", "));
            }
        }
        ProductCommand::Add {
            name,
            category,
            quantity,
            vendor,
            unit_cost,
            min_threshold,
        } => {
            let product = Product {
                id: String::new(),
                name,
                category,
                quantity,
                vendor,
                unit_cost: non_negative(unit_cost, "unit cost")?,
                min_threshold,
                created_at: None,
            };
            let added = session
                .state
                .add_product(session.store.as_ref(), product)?;
            println!("Added product {} ({})", added.name, added.id);
            if added.is_low_stock() {
                println!("Warning: {} is already at or below its minimum stock", added.name);
            }
        }
        ProductCommand::Update {
            id,
            name,
            category,
            quantity,
            vendor,
            unit_cost,
            min_threshold,
        } => {
            let update = ProductUpdate {
                name,
                category,
                quantity,
                vendor,
                unit_cost: unit_cost.map(|v| non_negative(v, "unit cost")).transpose()?,
                min_threshold,
            };
            let updated = session
                .state
                .update_product(session.store.as_ref(), &id, &update)?;
            println!("Updated product {} ({})", updated.name, updated.id);
        }
        ProductCommand::Delete { id } => {
            session.state.delete_product(session.store.as_ref(), &id)?;
            println!("Deleted product {id}");
        }
    }
    Ok(())
}

fn cmd_tasks(session: &mut Session, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::List {
            search,
            status,
            assignee,
        } => {
            let filter = TaskFilter {
                search,
                status,
                assignee,
            };
            let tasks = filter.apply(&session.state.tasks);

            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            let rows: Vec<TaskRow> = tasks.iter().map(|t| TaskRow::new(t)).collect();
            println!("{}", render(rows));

            let counts = task_status_counts(&session.state.tasks);
            println!();
            println!(
                "Pending: {} | In progress: {} | Completed: {}",
                counts.pending, counts.in_progress, counts.completed
            );
            let people = assignees(&session.state.tasks);
            if !people.is_empty() {
                println!("Assignees: {}", people.join(", "));
            }
        }
        TaskCommand::Add {
            customer,
            kind,
            assignee,
            scheduled,
            notes,
            status,
        } => {
            let customer_name = session
                .state
                .customer(&customer)
                .map(|c| c.name.clone())
                .ok_or_else(|| CrmError::CustomerNotFound(customer.clone()))?;
            let task = Task {
                id: String::new(),
                customer_id: customer,
                customer_name,
                kind,
                status,
                assigned_to: assignee,
                scheduled_date: date_arg(&scheduled)?,
                completed_date: None,
                notes,
                created_at: None,
            };
            let added = session.state.add_task(session.store.as_ref(), task)?;
            println!(
                "Scheduled {} for {} on {} ({})",
                added.kind, added.customer_name, added.scheduled_date, added.id
            );
        }
        TaskCommand::Update {
            id,
            kind,
            assignee,
            scheduled,
            notes,
            status,
        } => {
            let update = TaskUpdate {
                kind,
                assigned_to: assignee,
                scheduled_date: scheduled.as_deref().map(date_arg).transpose()?,
                notes,
                status,
                ..Default::default()
            };
            let updated = session
                .state
                .update_task(session.store.as_ref(), &id, &update)?;
            println!("Updated task {} ({})", updated.id, updated.status);
        }
        TaskCommand::Status { id, status } => {
            let updated = session
                .state
                .set_task_status(session.store.as_ref(), &id, status)?;
            println!("Task {} is now {}", updated.id, updated.status);
        }
        TaskCommand::Delete { id } => {
            session.state.delete_task(session.store.as_ref(), &id)?;
            println!("Deleted task {id}");
        }
    }
    Ok(())
}

fn cmd_invoices(session: &mut Session, cmd: InvoiceCommand) -> Result<()> {
    match cmd {
        InvoiceCommand::List { search } => {
            let invoices: Vec<&Invoice> = match search.as_deref() {
                Some(term) => search_invoices(&session.state.invoices, term),
                None => session.state.invoices.iter().collect(),
            };

            if invoices.is_empty() {
                println!("No invoices found.");
                return Ok(());
            }

            let rows: Vec<InvoiceRow> = invoices
                .iter()
                .map(|i| InvoiceRow {
                    id: i.id.clone(),
                    customer: i.customer_name.clone(),
                    date: display_date(i.created_at.as_deref()),
                    items: i.products.len(),
                    total: session.money(i.final_amount),
                })
                .collect();
            println!("{}", render(rows));

            let total: f64 = invoices.iter().map(|i| i.final_amount).sum();
            println!();
            println!("Total: {} invoices, {}", invoices.len(), session.money(total));
        }
        InvoiceCommand::Show { id } => {
            let invoice = session
                .state
                .invoice(&id)
                .ok_or_else(|| CrmError::InvoiceNotFound(id.clone()))?;
            print_invoice(session, invoice);
        }
        InvoiceCommand::Create {
            customer,
            item,
            custom,
            installed,
            taxes,
            company_address,
            gst,
            signatory,
            pdf,
        } => {
            let items = resolve_line_items(&item, &custom, &session.state.products)?;
            let draft = InvoiceDraft {
                customer_id: customer.clone(),
                items,
                installation_date: date_arg(&installed)?,
                taxes: non_negative(taxes, "taxes")?,
                company_address,
                gst_number: gst,
                signatory,
            };

            let invoice = session
                .state
                .create_invoice(session.store.as_ref(), draft)?
                .ok_or(CrmError::CustomerNotFound(customer))?;

            println!(
                "Created invoice {} for {}: {}",
                invoice.id,
                invoice.customer_name,
                session.money(invoice.final_amount)
            );

            if pdf {
                let path = default_pdf_path(session, &invoice.id);
                render_pdf(session, &invoice, &path)?;
                println!("Wrote {}", path.display());
            }
        }
        InvoiceCommand::Pdf { id, output, open } => {
            let invoice = session
                .state
                .invoice(&id)
                .ok_or_else(|| CrmError::InvoiceNotFound(id.clone()))?;
            let path = output.unwrap_or_else(|| default_pdf_path(session, &invoice.id));

            render_pdf(session, invoice, &path)?;
            println!("Wrote {}", path.display());

            if open {
                open_path(&path)?;
            }
        }
    }
    Ok(())
}

fn print_invoice(session: &Session, invoice: &Invoice) {
    println!("Invoice {}", invoice.id);
    println!("{}", "-".repeat(50));
    println!("Customer:     {}", invoice.customer_name);
    println!("Date:         {}", display_date(invoice.created_at.as_deref()));
    println!("Installation: {}", display_date(Some(invoice.installation_date.as_str())));
    if let Some(gst) = &invoice.gst_number {
        println!("GST:          {gst}");
    }
    if let Some(signatory) = &invoice.signatory {
        println!("Signatory:    {signatory}");
    }
    println!();

    let rows: Vec<LineRow> = invoice
        .products
        .iter()
        .enumerate()
        .map(|(idx, line)| LineRow {
            index: idx + 1,
            name: line.name.clone(),
            source: if line.is_custom() { "custom" } else { "catalog" },
            quantity: line.quantity,
            unit_cost: session.money(line.unit_cost),
            amount: session.money(line.amount()),
        })
        .collect();
    println!("{}", render(rows));

    println!("Subtotal: {}", session.money(invoice.total_cost));
    println!("Taxes:    {}", session.money(invoice.taxes));
    println!("Total:    {}", session.money(invoice.final_amount));
}

fn default_pdf_path(session: &Session, invoice_id: &str) -> PathBuf {
    resolve_dir(&session.config.pdf.output_dir, &session.cfg_dir).join(pdf_file_name(invoice_id))
}

fn render_pdf(session: &Session, invoice: &Invoice, path: &Path) -> Result<()> {
    let document = InvoiceDocument::new(
        invoice,
        session.state.customer(&invoice.customer_id),
        &session.config.company,
        &session.config.invoice,
    );
    write_invoice_pdf(&document, path)
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

fn cmd_export(session: &Session, collection: Collection, output: Option<PathBuf>) -> Result<()> {
    let Some(csv) = export_collection(&session.state, collection)? else {
        println!("No {collection} to export.");
        return Ok(());
    };

    let path = output.unwrap_or_else(|| PathBuf::from(csv_file_name(collection)));
    fs::write(&path, csv)?;

    let count = match collection {
        Collection::Customers => session.state.customers.len(),
        Collection::Products => session.state.products.len(),
        Collection::Tasks => session.state.tasks.len(),
        Collection::Invoices => session.state.invoices.len(),
    };
    println!("Exported {count} {collection} to {}", path.display());
    Ok(())
}

fn cmd_backup(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let now = Utc::now();
    let json = backup_json(&session.state, now)?;

    let path = output.unwrap_or_else(|| PathBuf::from(backup_file_name(now.date_naive())));
    fs::write(&path, json)?;

    let counts = session.state.counts();
    println!(
        "Backed up {} customers, {} products, {} tasks and {} invoices to {}",
        counts.customers,
        counts.products,
        counts.tasks,
        counts.invoices,
        path.display()
    );
    Ok(())
}
