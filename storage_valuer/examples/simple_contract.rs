use storage_valuer::{ContractScenario, StorageContractValuer};

fn main() {
    // Buy in May, sell in November
    let scenario = match ContractScenario::example() {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to build example contract: {}", e);
            return;
        }
    };

    let valuer = match StorageContractValuer::new(scenario.parameters.clone()) {
        Ok(valuer) => valuer,
        Err(e) => {
            eprintln!("Invalid contract parameters: {}", e);
            return;
        }
    };

    let result = valuer.valuate(&scenario.injections, &scenario.withdrawals);

    println!("Storage Contract Example");
    println!("========================");
    println!(
        "Capacity: {:.0} MMBtu, {:.0} MMBtu per injection / withdrawal",
        scenario.parameters.max_storage, scenario.parameters.injection_rate
    );
    println!();

    for event in &result.events {
        println!(
            "  {:?} on {}: {:.0} MMBtu @ ${:.2}",
            event.kind, event.date, event.rate, event.unit_price
        );
    }
    for diagnostic in &result.diagnostics {
        println!("  {}", diagnostic);
    }

    println!();
    println!("Revenue:   ${:.2}", result.sale_revenue);
    println!("Costs:     ${:.2}", result.total_costs());
    println!("The value of the contract is: ${:.2}", result.value);
}
