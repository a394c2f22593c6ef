use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use toolcat_api::RetryConfig;
use toolcat_cli::{dataset_source, github_client, init_tracing, star_cache};
use toolcat_core::providers::GitHubProvider;
use toolcat_core::{
    Catalogue, Config, DatasetLoader, DatasetSource, FileSource, FilterOptions, Maturity, SortOption,
    StarsResolver, Tool,
};

#[derive(Parser)]
#[command(name = "toolcat")]
#[command(version, about = "Browse the security tool catalogue", long_about = None)]
struct Cli {
    /// Directory holding tools.json and categories.json
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List tools, filtered and sorted
    List {
        /// Only tools in this category (repeatable)
        #[arg(long)]
        category: Vec<String>,
        /// Only tools for this platform (repeatable)
        #[arg(long)]
        platform: Vec<String>,
        /// Only tools under this license (repeatable)
        #[arg(long)]
        license: Vec<String>,
        /// Only tools at this maturity (repeatable)
        #[arg(long)]
        maturity: Vec<Maturity>,
        /// Free-text search over name, summary and tags
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order, e.g. stars-desc, name-asc, added_at-desc
        #[arg(long, default_value = "stars-desc")]
        sort: SortOption,
    },
    /// Show one tool, with a live star count when available
    Show {
        /// Tool id
        id: String,
    },
    /// List categories in display order
    Categories,
    /// Show the values available for each filter
    Facets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?;

    let source: Arc<dyn DatasetSource> = match &cli.data {
        Some(dir) => Arc::new(FileSource::new(
            dir.join("tools.json"),
            dir.join("categories.json"),
        )),
        None => dataset_source(&config),
    };
    let loader = DatasetLoader::new(source);
    let mut catalogue = Catalogue::from_loader(&loader).await;

    match cli.command {
        Some(Commands::List {
            category,
            platform,
            license,
            maturity,
            search,
            sort,
        }) => {
            let mut filters = FilterOptions::new();
            filters.categories.extend(category);
            filters.platforms.extend(platform);
            filters.licenses.extend(license);
            filters.maturity.extend(maturity);

            catalogue.set_filters(filters);
            catalogue.set_search_query(search.unwrap_or_default());
            catalogue.set_sort_option(sort);

            let view = catalogue.view();
            if view.is_empty() {
                println!("No tools found");
                return Ok(());
            }
            for tool in view.iter() {
                print_row(tool);
            }
            let mut footer = format!("\n{} of {} tools", view.len(), catalogue.tools().len());
            if !catalogue.search_query().trim().is_empty() {
                footer.push_str(&format!(" matching '{}'", catalogue.search_query().trim()));
            }
            if !catalogue.filters().is_empty() {
                footer.push_str(" (filtered)");
            }
            println!("{}, sorted by {}", footer, catalogue.sort_option());
        }
        Some(Commands::Show { id }) => {
            let Some(tool) = catalogue.tool_by_id(&id) else {
                anyhow::bail!("No tool with id '{}'", id);
            };

            let client = github_client(&config, RetryConfig::none())?;
            let provider = Arc::new(GitHubProvider::new(client));
            let resolver = StarsResolver::new(provider, star_cache(&config))
                .with_ttl_hours(config.cache.ttl_hours);
            let stars = resolver.stars_for(tool).await;

            print_details(&catalogue, tool, stars);
        }
        Some(Commands::Categories) => {
            for category in catalogue.categories() {
                let count = catalogue
                    .tools()
                    .iter()
                    .filter(|t| t.categories.contains(&category.id))
                    .count();
                println!("{:<24} {:<32} {}", category.id, category.name, count);
            }
        }
        Some(Commands::Facets) => {
            println!("Categories: {}", catalogue.available_categories().join(", "));
            println!("Platforms:  {}", catalogue.available_platforms().join(", "));
            println!("Licenses:   {}", catalogue.available_licenses().join(", "));
        }
        None => {
            println!("No command specified. Try --help");
        }
    }

    Ok(())
}

fn print_row(tool: &Tool) {
    let stars = tool
        .stars
        .map(|s| format!("★ {}", s))
        .unwrap_or_else(|| "-".to_string());
    println!("{:<20} {:<28} {:>10}  {}", tool.id, tool.name, stars, tool.summary);
}

fn print_details(catalogue: &Catalogue, tool: &Tool, stars: Option<u32>) {
    println!("{} ({})", tool.name, tool.id);
    println!("{}", tool.summary);
    if let Some(description) = &tool.description {
        println!("\n{}\n", description);
    }

    let categories: Vec<&str> = tool
        .categories
        .iter()
        .map(|id| catalogue.category_by_id(id).map_or(id.as_str(), |c| c.name.as_str()))
        .collect();
    println!("Categories: {}", categories.join(", "));
    println!("Platforms:  {}", tool.platforms.join(", "));
    println!("License:    {}", tool.license);
    println!("Maturity:   {}", tool.maturity.as_str());
    if let Some(stars) = stars {
        println!("Stars:      {}", stars);
    }
    if let Some(repo) = tool.github_repo() {
        println!("GitHub:     https://github.com/{}", repo);
    }
    if let Some(website) = &tool.website {
        println!("Website:    {}", website);
    }
    if let Some(docs) = &tool.docs_url {
        println!("Docs:       {}", docs);
    }

    let related: Vec<&str> = catalogue
        .related_tools(tool)
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    if !related.is_empty() {
        println!("Related:    {}", related.join(", "));
    }
    let similar: Vec<&str> = catalogue
        .similar_tools(tool)
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    if !similar.is_empty() {
        println!("Similar:    {}", similar.join(", "));
    }
}
