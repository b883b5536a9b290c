fn main() {
    println!("snpkit - consumer DNA raw data tools");
    println!();
    println!("Tools:");
    println!("  merge_dna_files - Merge 23andMe / AncestryDNA / Genes for Good files → one 23andMe-style file");
    println!("  roh_test        - Report runs of homozygosity and no-call runs in one raw data file");
    println!();
    println!("For help with each tool:");
    println!("  cargo run --bin merge_dna_files -- --help");
    println!("  cargo run --bin roh_test -- --help");
    println!();
    println!("Quick start examples:");
    println!("  cargo run --bin merge_dna_files -- AncestryDNA.txt genome_John_Doe.txt -o merged.txt");
    println!("  cargo run --bin roh_test -- --file merged.txt");
}
