use clap::Parser;
use ocean_fetch::OceanFetchCli;

#[tokio::main]
async fn main() {
    let cli = OceanFetchCli::parse();
    let code = ocean_fetch::app::run_product(cli.product, cli.args).await;
    std::process::exit(code);
}
