//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Name,
    Email,
    PasswordHash,
    PasswordSalt,
    ProviderUid,
    Role,
    IsCertifiedGuide,
    ProfileImage,
    PreferredWeather,
    PreferredWeight,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Packs {
    Table,
    Id,
    Name,
    OwnerId,
    IsPublic,
    Type,
    TotalWeight,
    TotalScore,
    FavoritesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum ItemCategories {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
    Name,
    Weight,
    Quantity,
    Unit,
    Global,
    OwnerId,
    CategoryId,
    Type,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum PackItems {
    Table,
    PackId,
    ItemId,
    CreatedAt,
}

#[derive(Iden)]
pub enum Favorites {
    Table,
    UserId,
    PackId,
    CreatedAt,
}

#[derive(Iden)]
pub enum Trips {
    Table,
    Id,
    Name,
    Description,
    Duration,
    Weather,
    StartDate,
    EndDate,
    Destination,
    OwnerId,
    IsPublic,
    Type,
    GeojsonId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Templates {
    Table,
    Id,
    Type,
    SourceId,
    IsGlobal,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Conversations {
    Table,
    Id,
    UserId,
    History,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum Geojson {
    Table,
    Id,
    Type,
    Properties,
    Geometry,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum OsmNodes {
    Table,
    Id,
    OsmId,
    OsmType,
    Lat,
    Lon,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum OsmWays {
    Table,
    Id,
    OsmId,
    OsmType,
    Tags,
    Nodes,
    Geojson,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum OsmRelations {
    Table,
    Id,
    OsmId,
    OsmType,
    Tags,
    Members,
    Geojson,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum RefreshTokens {
    Table,
    Id,
    UserId,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}
