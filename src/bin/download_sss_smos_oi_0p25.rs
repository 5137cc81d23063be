use clap::Parser;
use ocean_fetch::{Product, ProductCli};

#[tokio::main]
async fn main() {
    let cli = ProductCli::parse();
    let code = ocean_fetch::app::run_product(Product::SssSmosOi, cli.args).await;
    std::process::exit(code);
}
