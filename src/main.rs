use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

use cmv_dashboard::{
    export_detalhado, export_resumo_os, formatar_moeda, formatar_moeda_compacto, load_grid,
    processar_planilha, Dashboard, FilterCriteria, RiskTier,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        return Ok(());
    }

    if args[0] == "export" {
        run_export(&args[1..])
    } else {
        run_report(&args)
    }
}

fn print_usage() {
    println!("📊 Análise de CMV - Dashboard de execução orçamentária");
    println!();
    println!("Uso:");
    println!("  cmv-dashboard <planilha> [filtros]        Relatório no terminal");
    println!("  cmv-dashboard export <planilha> <dir>     Gera os CSVs de exportação");
    println!();
    println!("Filtros:");
    println!("  --status ESTOURADO,CRÍTICO    Classificações de risco a exibir");
    println!("  --os 3185,3200                OSs a incluir");
    println!("  --familia ACO,TINTA           Famílias a incluir");
    println!("  --busca 31                    Busca textual nas opções de OS");
    println!();
    println!("Estrutura esperada: O_S | FAMILIA | PREVISTO | REALIZADO | SALDO");
}

/// Split a `key,key` flag value, trimming each entry.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `<planilha> [--status ..] [--os ..] [--familia ..] [--busca ..]`.
fn parse_args(args: &[String]) -> Result<(PathBuf, FilterCriteria)> {
    let mut path: Option<PathBuf> = None;
    let mut criteria = FilterCriteria::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--status" => {
                let value = iter.next().map(String::as_str).unwrap_or("");
                for label in split_list(value) {
                    match RiskTier::from_label(&label) {
                        Some(tier) => criteria.status.push(tier),
                        None => bail!("Status desconhecido: {:?}", label),
                    }
                }
            }
            "--os" => {
                criteria.os = split_list(iter.next().map(String::as_str).unwrap_or(""));
            }
            "--familia" => {
                criteria.familias = split_list(iter.next().map(String::as_str).unwrap_or(""));
            }
            "--busca" => {
                criteria.busca_os = iter.next().cloned().unwrap_or_default();
            }
            other if other.starts_with("--") => bail!("Opção desconhecida: {}", other),
            other => {
                if path.is_some() {
                    bail!("Mais de uma planilha informada: {}", other);
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    match path {
        Some(path) => Ok((path, criteria)),
        None => bail!("Informe o arquivo da planilha"),
    }
}

fn load_records(path: &Path) -> Result<Vec<cmv_dashboard::CostRecord>> {
    println!("📂 Carregando {:?}...", path);
    let grid = load_grid(path)?;

    match processar_planilha(&grid) {
        Ok(records) => {
            println!("✓ {} registros normalizados\n", records.len());
            Ok(records)
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Estrutura esperada: O_S | FAMILIA | PREVISTO | REALIZADO | SALDO");
            std::process::exit(1);
        }
    }
}

fn run_report(args: &[String]) -> Result<()> {
    let (path, criteria) = parse_args(args)?;
    let records = load_records(&path)?;
    let dashboard = Dashboard::build(&records, &criteria);

    if dashboard.is_empty() {
        println!("⚠️  Nenhum dado encontrado com os filtros atuais.");
        println!("   Dica: limpe os filtros ou remova algum critério.");
        return Ok(());
    }

    // Headline metrics
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "💰 Previsto: {}   💸 Realizado: {}   📊 Saldo: {}   📈 Execução: {:.1}%",
        formatar_moeda_compacto(dashboard.totais.previsto),
        formatar_moeda_compacto(dashboard.totais.realizado),
        formatar_moeda_compacto(dashboard.totais.saldo),
        dashboard.totais.execution_pct,
    );

    // Status cards (whole portfolio, not just the filtered view)
    println!("\n🚦 Resumo por Status");
    for tier in RiskTier::ALL {
        let count = dashboard.contadores.get(tier);
        if count > 0 || tier != RiskTier::NoBudget {
            println!("   {} {:<13} {}", tier.emoji(), tier.label(), count);
        }
    }

    // Per-OS list, execution descending
    println!(
        "\n🎯 OSs por Execução ({} projetos)",
        dashboard.por_os.len()
    );
    if dashboard.por_os.is_empty() {
        println!("   Nenhuma OS encontrada com os filtros selecionados.");
    }
    for os in &dashboard.por_os {
        println!(
            "\n{} OS {} • {} • {} → {} • Saldo: {} • {:.0}%",
            os.risco.emoji(),
            os.key,
            os.risco.label(),
            formatar_moeda_compacto(os.previsto),
            formatar_moeda_compacto(os.realizado),
            formatar_moeda_compacto(os.saldo),
            os.execution_pct,
        );

        for familia in dashboard.familias_of_os(&os.key) {
            println!(
                "   {} {:<24} Prev: {:>14}  Real: {:>14}  Saldo: {:>14}  {:.0}%",
                familia.risco.emoji(),
                familia.key,
                formatar_moeda(familia.previsto),
                formatar_moeda(familia.realizado),
                formatar_moeda(familia.saldo),
                familia.execution_pct,
            );
        }
    }

    // Família view
    println!("\n📦 Visão Consolidada por Família");
    for familia in &dashboard.por_familia {
        println!(
            "   {} {:<24} {:<13} Exec: {:>5.0}%  {} OSs",
            familia.risco.emoji(),
            familia.key,
            familia.risco.label(),
            familia.execution_pct,
            dashboard.os_of_familia(&familia.key).len(),
        );
    }

    Ok(())
}

fn run_export(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        bail!("Uso: cmv-dashboard export <planilha> <dir> [filtros]");
    }

    let out_dir = PathBuf::from(&args[1]);
    let mut rest: Vec<String> = vec![args[0].clone()];
    rest.extend_from_slice(&args[2..]);

    let (path, criteria) = parse_args(&rest)?;
    let records = load_records(&path)?;
    let dashboard = Dashboard::build(&records, &criteria);

    std::fs::create_dir_all(&out_dir)?;

    let detalhado = out_dir.join("cmv_detalhado.csv");
    std::fs::write(&detalhado, export_detalhado(&dashboard.registros)?)?;
    println!(
        "✓ {} ({} registros)",
        detalhado.display(),
        dashboard.registros.len()
    );

    let por_os = out_dir.join("cmv_por_os.csv");
    std::fs::write(&por_os, export_resumo_os(&dashboard.por_os)?)?;
    println!("✓ {} ({} OSs)", por_os.display(), dashboard.por_os.len());

    Ok(())
}
