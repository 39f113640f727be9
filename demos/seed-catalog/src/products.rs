use catalog::ProductRecord;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

const SAMPLE: [(&str, &str, f64, i64, &str); 15] = [
    ("Laptop Pro", "Electronics", 999.99, 15, "High-performance laptop with RTX GPU"),
    ("Wireless Mouse", "Accessories", 29.99, 150, "Wireless optical mouse with ergonomic design"),
    ("Mechanical Keyboard", "Electronics", 79.99, 80, "RGB mechanical keyboard with hot-swap switches"),
    ("4K Monitor", "Electronics", 299.99, 20, "4K IPS display monitor for professionals"),
    ("USB-C Cable", "Accessories", 19.99, 500, "2m USB-C charging and data cable"),
    ("Laptop Stand", "Accessories", 49.99, 75, "Adjustable aluminum laptop stand"),
    ("Desk Lamp", "Accessories", 39.99, 120, "LED desk lamp with USB charging"),
    ("Mouse Pad", "Accessories", 9.99, 200, "Large anti-slip mouse pad"),
    ("USB Hub", "Electronics", 24.99, 95, "7-port USB 3.0 hub with power adapter"),
    ("Phone Stand", "Accessories", 14.99, 180, "Adjustable phone stand for desk"),
    ("Webcam HD", "Electronics", 89.99, 45, "Full HD 1080p webcam with microphone"),
    ("External SSD", "Electronics", 149.99, 30, "1TB portable SSD storage"),
    ("Portable Speaker", "Audio", 59.99, 65, "Bluetooth portable speaker with 10h battery"),
    ("HDMI Cable", "Cables", 12.99, 300, "2m HDMI 2.1 cable"),
    ("Desk Organizer", "Office Supplies", 34.99, 110, "Multi-compartment desk organizer"),
];

const NAMES: [&str; 60] = [
    "Laptop Pro", "Wireless Mouse", "Mechanical Keyboard", "4K Monitor", "USB-C Cable",
    "Laptop Stand", "Desk Lamp", "Mouse Pad", "USB Hub", "Phone Stand",
    "Webcam HD", "External SSD", "Portable Speaker", "HDMI Cable", "Desk Organizer",
    "Wireless Charger", "Monitor Arm", "Desk Mat", "USB-A Hub", "Screen Protector",
    "Keyboard Switch Puller", "Cable Organizer", "Desktop Fan", "LED Strip", "Microphone Stand",
    "Pop Filter", "XLR Cable", "Audio Interface", "Studio Monitor", "Headphone Stand",
    "Cooling Pad", "Power Bank", "USB Splitter", "Card Reader", "Docking Station",
    "USB-C Adapter", "HDMI Splitter", "Network Cable", "Surge Protector", "Extension Cord",
    "Desk Pad", "Monitor Light Bar", "Keyboard Stabilizer", "Keycap Set", "Switch Tester",
    "Cable Sleeve", "Clip Lamp", "Ring Light", "Tripod", "Phone Clip",
    "Tablet Stand", "Monitor Stand", "Desk Riser", "Footrest", "Back Cushion",
    "Wrist Rest", "Mouse Bungee", "Cable Box", "Drawer Organizer", "File Organizer",
];

const CATEGORIES: [&str; 10] = [
    "Electronics", "Accessories", "Audio", "Cables", "Office Supplies",
    "Lighting", "Furniture", "Peripherals", "Storage", "Networking",
];

const SUPPLIERS: [&str; 5] = ["TechCorp", "ElectroSupply", "GlobalTrade", "DirectImport", "ProVendor"];
const STATUSES: [&str; 3] = ["Active", "Inactive", "Discontinued"];

pub fn sample() -> Vec<ProductRecord> {
    SAMPLE
        .iter()
        .zip(1..)
        .map(|(&(name, category, price, stock, description), id)| {
            let mut rec = ProductRecord::new(id, name, category, price, stock);
            rec.description = Some(description.to_string());
            rec
        })
        .collect()
}

pub fn extended<R: Rng>(count: usize, rng: &mut R) -> Vec<ProductRecord> {
    (1..=count as i64)
        .map(|id| {
            let name = NAMES.choose(rng).copied().unwrap_or(NAMES[0]);
            let category = CATEGORIES.choose(rng).copied().unwrap_or(CATEGORIES[0]);
            // cents
            let price = (rng.gen_range(9.99..=999.99_f64) * 100.0).round() / 100.0;
            let stock = rng.gen_range(0..=500);

            let mut rec = ProductRecord::new(id, name, category, price, stock);
            rec.sku = Some(format!("SKU-{id:05}"));
            rec.supplier = SUPPLIERS.choose(rng).map(|s| s.to_string());
            rec.last_updated = NaiveDate::from_ymd_opt(2025, rng.gen_range(1..=12), rng.gen_range(1..=28))
                .map(|d| d.format("%Y-%m-%d").to_string());
            rec.status = STATUSES.choose(rng).map(|s| s.to_string());
            rec
        })
        .collect()
}
